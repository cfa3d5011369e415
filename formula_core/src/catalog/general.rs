//! General textbook relations.

use super::{FormulaDefinition, Topic, VariableInfo};

pub fn definitions() -> Vec<FormulaDefinition> {
    vec![
        FormulaDefinition {
            id: "IdealGasMolar",
            name: "Ideal Gas Law (Molar)",
            description: "Pressure, volume and temperature of n moles of an ideal gas",
            topic: Topic::General,
            equation: "P * V = n * R * T",
            variables: vec![
                VariableInfo::new("P", "Pressure", "Pa"),
                VariableInfo::new("V", "Volume", "m^3"),
                VariableInfo::new("n", "Amount of substance", "mol"),
                VariableInfo::new("R", "Universal gas constant", "J/(mol K)"),
                VariableInfo::new("T", "Absolute temperature", "K"),
            ],
            assumptions: vec!["Ideal gas (no intermolecular forces)"],
        },
        FormulaDefinition {
            id: "CircleArea",
            name: "Circle Area",
            description: "Area enclosed by a circle of radius r",
            topic: Topic::General,
            equation: "A = pi * r^2",
            variables: vec![
                VariableInfo::new("A", "Area", "m^2"),
                VariableInfo::new("r", "Radius", "m"),
            ],
            assumptions: vec!["Solving for r returns the positive root"],
        },
    ]
}

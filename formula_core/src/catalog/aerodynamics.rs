//! Aerodynamics: similarity parameters and viscosity.

use super::{FormulaDefinition, Topic, VariableInfo};

const REYNOLDS: VariableInfo = VariableInfo::new("Re", "Reynolds number", "-");
const DENSITY: VariableInfo = VariableInfo::new("rho", "Density", "kg/m^3");
const VELOCITY: VariableInfo = VariableInfo::new("V", "Free-stream velocity", "m/s");
const CHORD: VariableInfo = VariableInfo::new("c", "Characteristic length (chord)", "m");
const DYNAMIC_VISCOSITY: VariableInfo = VariableInfo::new("mu", "Dynamic viscosity", "Pa s");

pub fn definitions() -> Vec<FormulaDefinition> {
    vec![
        FormulaDefinition {
            id: "ReynoldsNumber",
            name: "Reynolds Number",
            description: "Ratio of inertial to viscous forces",
            topic: Topic::Aerodynamics,
            equation: "Re = rho * V * c / mu",
            variables: vec![REYNOLDS, DENSITY, VELOCITY, CHORD, DYNAMIC_VISCOSITY],
            assumptions: vec![],
        },
        FormulaDefinition {
            id: "DynamicViscosity",
            name: "Dynamic Viscosity",
            description: "Dynamic viscosity recovered from a known Reynolds number",
            topic: Topic::Aerodynamics,
            equation: "mu = rho * V * c / Re",
            variables: vec![DYNAMIC_VISCOSITY, DENSITY, VELOCITY, CHORD, REYNOLDS],
            assumptions: vec![],
        },
        FormulaDefinition {
            id: "KinematicViscosity",
            name: "Kinematic Viscosity",
            description: "Dynamic viscosity per unit density",
            topic: Topic::Aerodynamics,
            equation: "nu = mu / rho",
            variables: vec![
                VariableInfo::new("nu", "Kinematic viscosity", "m^2/s"),
                DYNAMIC_VISCOSITY,
                DENSITY,
            ],
            assumptions: vec!["Newtonian fluid"],
        },
    ]
}

//! # Thermodynamics
//!
//! Specific (per unit mass) ideal gas law and the isentropic relations of a
//! calorically perfect gas. `C` in the adiabatic relations is the constant of
//! the process; it is only meaningful between two states of the same process.

use super::{FormulaDefinition, Topic, VariableInfo};

const PRESSURE: VariableInfo = VariableInfo::new("p", "Static pressure", "Pa");
const TEMPERATURE: VariableInfo = VariableInfo::new("T", "Static temperature", "K");
const SPECIFIC_VOLUME: VariableInfo = VariableInfo::new("v", "Specific volume", "m^3/kg");
const KAPPA: VariableInfo = VariableInfo::new("kappa", "Ratio of specific heats", "-");
const PROCESS_CONSTANT: VariableInfo = VariableInfo::new("C", "Process constant", "-");

pub fn definitions() -> Vec<FormulaDefinition> {
    vec![
        FormulaDefinition {
            id: "IdealGasLaw",
            name: "Ideal Gas Law",
            description: "Thermal equation of state using density and specific gas constant",
            topic: Topic::Thermodynamics,
            equation: "p = rho * R * T",
            variables: vec![
                PRESSURE,
                VariableInfo::new("rho", "Density", "kg/m^3"),
                VariableInfo::new("R", "Specific gas constant", "J/(kg K)"),
                TEMPERATURE,
            ],
            assumptions: vec!["Ideal gas"],
        },
        FormulaDefinition {
            id: "AdiabaticPressureVolume",
            name: "Adiabatic Relation (p, v)",
            description: "Pressure and specific volume along an isentropic process",
            topic: Topic::Thermodynamics,
            equation: "p * v^kappa = C",
            variables: vec![PRESSURE, SPECIFIC_VOLUME, KAPPA, PROCESS_CONSTANT],
            assumptions: vec!["Reversible adiabatic process", "Constant kappa"],
        },
        FormulaDefinition {
            id: "AdiabaticTemperatureVolume",
            name: "Adiabatic Relation (T, v)",
            description: "Temperature and specific volume along an isentropic process",
            topic: Topic::Thermodynamics,
            equation: "T * v^(kappa - 1) = C",
            variables: vec![TEMPERATURE, SPECIFIC_VOLUME, KAPPA, PROCESS_CONSTANT],
            assumptions: vec!["Reversible adiabatic process", "Constant kappa"],
        },
        FormulaDefinition {
            id: "AdiabaticTemperaturePressure",
            name: "Adiabatic Relation (T, p)",
            description: "Temperature and pressure along an isentropic process",
            topic: Topic::Thermodynamics,
            equation: "T * p^((1 - kappa) / kappa) = C",
            variables: vec![TEMPERATURE, PRESSURE, KAPPA, PROCESS_CONSTANT],
            assumptions: vec!["Reversible adiabatic process", "Constant kappa"],
        },
    ]
}

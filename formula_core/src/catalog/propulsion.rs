//! # Rocket Propulsion
//!
//! Thrust, exhaust velocity and nozzle performance figures for an ideal
//! rocket. Subscripts follow the usual convention: `e` nozzle exit, `a`
//! ambient, `t` throat, `0` chamber (stagnation) state.
//!
//! `Gamma` is the Vandenkerckhove function of kappa. It is taken as an input
//! here since it has no closed-form inverse.

use super::{FormulaDefinition, Topic, VariableInfo};

const THRUST: VariableInfo = VariableInfo::new("F", "Thrust", "N");
const MASS_FLOW: VariableInfo = VariableInfo::new("m_dot", "Propellant mass flow", "kg/s");
const EFFECTIVE_EXHAUST: VariableInfo = VariableInfo::new("c_e", "Effective exhaust velocity", "m/s");
const EXIT_VELOCITY: VariableInfo = VariableInfo::new("w_e", "Nozzle exit velocity", "m/s");
const EXIT_PRESSURE: VariableInfo = VariableInfo::new("p_e", "Nozzle exit pressure", "Pa");
const AMBIENT_PRESSURE: VariableInfo = VariableInfo::new("p_a", "Ambient pressure", "Pa");
const EXIT_AREA: VariableInfo = VariableInfo::new("A_e", "Nozzle exit area", "m^2");
const CHAMBER_PRESSURE: VariableInfo = VariableInfo::new("p0", "Chamber pressure", "Pa");
const CHAMBER_TEMPERATURE: VariableInfo = VariableInfo::new("T0", "Chamber temperature", "K");
const THROAT_AREA: VariableInfo = VariableInfo::new("A_t", "Throat area", "m^2");
const GAS_CONSTANT: VariableInfo = VariableInfo::new("R", "Specific gas constant", "J/(kg K)");
const GAMMA: VariableInfo = VariableInfo::new("Gamma", "Vandenkerckhove function", "-");
const CHARACTERISTIC_VELOCITY: VariableInfo = VariableInfo::new("c_star", "Characteristic velocity", "m/s");
const THRUST_COEFFICIENT: VariableInfo = VariableInfo::new("c_f", "Thrust coefficient", "-");
const SPECIFIC_IMPULSE: VariableInfo = VariableInfo::new("I_s", "Specific impulse", "s");
const STANDARD_GRAVITY: VariableInfo = VariableInfo::new("g0", "Standard gravity", "m/s^2");

pub fn definitions() -> Vec<FormulaDefinition> {
    vec![
        FormulaDefinition {
            id: "GeneralThrust",
            name: "General Thrust Equation",
            description: "Thrust from mass flow and effective exhaust velocity",
            topic: Topic::Propulsion,
            equation: "F = m_dot * c_e",
            variables: vec![THRUST, MASS_FLOW, EFFECTIVE_EXHAUST],
            assumptions: vec!["Steady flow"],
        },
        FormulaDefinition {
            id: "ThrustExpanded",
            name: "Thrust with Pressure Term",
            description: "Momentum thrust plus pressure thrust at the nozzle exit",
            topic: Topic::Propulsion,
            equation: "F = m_dot * w_e + (p_e - p_a) * A_e",
            variables: vec![THRUST, MASS_FLOW, EXIT_VELOCITY, EXIT_PRESSURE, AMBIENT_PRESSURE, EXIT_AREA],
            assumptions: vec!["Steady flow", "Uniform exit plane conditions"],
        },
        FormulaDefinition {
            id: "EffectiveExhaustVelocity",
            name: "Effective Exhaust Velocity",
            description: "Exit velocity corrected for the pressure thrust",
            topic: Topic::Propulsion,
            equation: "c_e = w_e + (p_e - p_a) * A_e / m_dot",
            variables: vec![EFFECTIVE_EXHAUST, EXIT_VELOCITY, EXIT_PRESSURE, AMBIENT_PRESSURE, EXIT_AREA, MASS_FLOW],
            assumptions: vec!["Uniform exit plane conditions"],
        },
        FormulaDefinition {
            id: "ExhaustVelocityCoefficients",
            name: "Effective Exhaust Velocity (c*, c_f)",
            description: "Effective exhaust velocity split into chamber and nozzle contributions",
            topic: Topic::Propulsion,
            equation: "c_e = c_star * c_f",
            variables: vec![EFFECTIVE_EXHAUST, CHARACTERISTIC_VELOCITY, THRUST_COEFFICIENT],
            assumptions: vec![],
        },
        FormulaDefinition {
            id: "SpecificImpulse",
            name: "Specific Impulse",
            description: "Impulse per unit weight of propellant",
            topic: Topic::Propulsion,
            equation: "I_s = c_e / g0",
            variables: vec![SPECIFIC_IMPULSE, EFFECTIVE_EXHAUST, STANDARD_GRAVITY],
            assumptions: vec![],
        },
        FormulaDefinition {
            id: "SpecificImpulseThrust",
            name: "Specific Impulse (Thrust)",
            description: "Specific impulse from thrust and propellant mass flow",
            topic: Topic::Propulsion,
            equation: "I_s = F / (m_dot * g0)",
            variables: vec![SPECIFIC_IMPULSE, THRUST, MASS_FLOW, STANDARD_GRAVITY],
            assumptions: vec!["Steady flow"],
        },
        FormulaDefinition {
            id: "ThrustCoefficient",
            name: "Thrust Coefficient",
            description: "Thrust normalised by chamber pressure and throat area",
            topic: Topic::Propulsion,
            equation: "c_f = F / (p0 * A_t)",
            variables: vec![
                THRUST_COEFFICIENT,
                THRUST,
                CHAMBER_PRESSURE,
                THROAT_AREA,
            ],
            assumptions: vec![],
        },
        FormulaDefinition {
            id: "MassFlowDensity",
            name: "Mass Flow (Continuity)",
            description: "Mass flow through a cross-section from density and velocity",
            topic: Topic::Propulsion,
            equation: "m_dot = rho * w * A",
            variables: vec![
                MASS_FLOW,
                VariableInfo::new("rho", "Density", "kg/m^3"),
                VariableInfo::new("w", "Flow velocity", "m/s"),
                VariableInfo::new("A", "Cross-section area", "m^2"),
            ],
            assumptions: vec!["Uniform flow across the section"],
        },
        FormulaDefinition {
            id: "MassFlowThroat",
            name: "Mass Flow (Choked Throat)",
            description: "Mass flow through a choked nozzle throat",
            topic: Topic::Propulsion,
            equation: "m_dot = p0 * A_t / sqrt(R * T0) * Gamma",
            variables: vec![MASS_FLOW, CHAMBER_PRESSURE, THROAT_AREA, GAS_CONSTANT, CHAMBER_TEMPERATURE, GAMMA],
            assumptions: vec!["Choked (sonic) throat", "Isentropic nozzle flow"],
        },
        FormulaDefinition {
            id: "CharacteristicLength",
            name: "Characteristic Length",
            description: "Chamber volume per throat area",
            topic: Topic::Propulsion,
            equation: "L_star = V0 / A_t",
            variables: vec![
                VariableInfo::new("L_star", "Characteristic length", "m"),
                VariableInfo::new("V0", "Chamber volume", "m^3"),
                THROAT_AREA,
            ],
            assumptions: vec![],
        },
        FormulaDefinition {
            id: "CharacteristicVelocity",
            name: "Characteristic Velocity",
            description: "Combustion performance figure from chamber temperature",
            topic: Topic::Propulsion,
            equation: "c_star = sqrt(R * T0 / Gamma)",
            variables: vec![CHARACTERISTIC_VELOCITY, GAS_CONSTANT, CHAMBER_TEMPERATURE, GAMMA],
            assumptions: vec!["Ideal gas", "Choked throat"],
        },
        FormulaDefinition {
            id: "CharacteristicVelocityThroat",
            name: "Characteristic Velocity (Measured)",
            description: "Characteristic velocity from chamber pressure, throat area and mass flow",
            topic: Topic::Propulsion,
            equation: "c_star = p0 * A_t / m_dot",
            variables: vec![CHARACTERISTIC_VELOCITY, CHAMBER_PRESSURE, THROAT_AREA, MASS_FLOW],
            assumptions: vec![],
        },
    ]
}

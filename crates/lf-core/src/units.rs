//! SI electrical quantities and the conversions used by the extractors.

use std::f64::consts::TAU;

use uom::si::f64::{
    Angle as UomAngle, Capacitance as UomCapacitance, ElectricPotential as UomElectricPotential,
    ElectricalConductance as UomElectricalConductance,
    ElectricalResistance as UomElectricalResistance, Frequency as UomFrequency,
    Length as UomLength, Power as UomPower,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Capacitance = UomCapacitance;
pub type Conductance = UomElectricalConductance;
pub type Frequency = UomFrequency;
pub type Length = UomLength;
/// Active, reactive and apparent power all share the watt dimension.
pub type Power = UomPower;
pub type Resistance = UomElectricalResistance;
pub type Voltage = UomElectricPotential;

#[inline]
pub fn kv(v: f64) -> Voltage {
    use uom::si::electric_potential::kilovolt;
    Voltage::new::<kilovolt>(v)
}

#[inline]
pub fn mva(v: f64) -> Power {
    use uom::si::power::megawatt;
    Power::new::<megawatt>(v)
}

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn microfarad(v: f64) -> Capacitance {
    use uom::si::capacitance::microfarad;
    Capacitance::new::<microfarad>(v)
}

#[inline]
pub fn km(v: f64) -> Length {
    use uom::si::length::kilometer;
    Length::new::<kilometer>(v)
}

#[inline]
pub fn to_megavars(p: Power) -> f64 {
    use uom::si::power::megawatt;
    p.get::<megawatt>()
}

#[inline]
pub fn to_ohms(r: Resistance) -> f64 {
    use uom::si::electrical_resistance::ohm;
    r.get::<ohm>()
}

#[inline]
pub fn to_nanofarads(c: Capacitance) -> f64 {
    use uom::si::capacitance::nanofarad;
    c.get::<nanofarad>()
}

#[inline]
pub fn to_kilometers(l: Length) -> f64 {
    use uom::si::length::kilometer;
    l.get::<kilometer>()
}

/// Per-unit conversions for balanced three-phase quantities.
pub mod electrical {
    use super::*;

    /// Base impedance `U² / S` for a line-to-line voltage base and a three-phase power base.
    pub fn base_impedance(u_base: Voltage, s_base: Power) -> Resistance {
        u_base * u_base / s_base
    }

    /// Reactive power delivered by a shunt capacitance, `2πf · C · U²`.
    pub fn capacitor_reactive_power(f: Frequency, c: Capacitance, u: Voltage) -> Power {
        f * c * u * u * TAU
    }

    /// Capacitance equivalent of a shunt susceptance given in per unit of `z_base`.
    pub fn susceptance_to_capacitance(b_pu: f64, z_base: Resistance, f: Frequency) -> Capacitance {
        let y: Conductance = z_base.recip() * b_pu;
        y / (f * TAU)
    }
}

//! Engine components built on [`crate::dod`].

pub mod irradiance_probe;

pub use irradiance_probe::{
    IrradianceProbeData, IrradianceProbeManager, IrradianceProbeRef, MAX_IRRADIANCE_PROBE_COUNT,
    SORT_SPAN,
};

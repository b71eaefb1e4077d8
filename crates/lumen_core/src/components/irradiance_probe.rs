//! Irradiance probe component
//!
//! A probe stores two pre-baked spherical-harmonics lighting blocks (day
//! and night), an influence radius and a priority the renderer uses to
//! pick probes when it runs over its probe budget.

use lumen_metrics::SpanProfiler;

use crate::dod::{
    ColumnSet, ComponentDescriptor, ComponentManager, DescriptorError, EntityRef, Properties,
    PropertyReader, PropertyWriter, Ref, StoreError,
};
use crate::math::ShCoeffs;
use crate::soa_columns;

/// Default number of probe slots.
pub const MAX_IRRADIANCE_PROBE_COUNT: usize = 128;

pub const DEFAULT_RADIUS: f32 = 20.0;
pub const DEFAULT_PRIORITY: u32 = 0;

/// Profiler span recorded around every probe sort.
pub const SORT_SPAN: &str = "Sort Irradiance Probes";

soa_columns! {
    /// Column storage for every irradiance probe.
    pub struct IrradianceProbeData: "IrradianceProbe" {
        /// Influence radius in world units.
        radius: f32 = DEFAULT_RADIUS,
        /// Selection priority; probes are consumed in ascending order.
        priority: u32 = DEFAULT_PRIORITY,
        sh_day: ShCoeffs = ShCoeffs::ZERO,
        sh_night: ShCoeffs = ShCoeffs::ZERO,
    }
}

pub type IrradianceProbeRef = Ref<IrradianceProbeData>;
pub type IrradianceProbeManager = ComponentManager<IrradianceProbeData>;

impl Default for ComponentManager<IrradianceProbeData> {
    fn default() -> Self {
        Self::new(MAX_IRRADIANCE_PROBE_COUNT)
    }
}

impl ComponentManager<IrradianceProbeData> {
    pub fn create_irradiance_probe(
        &mut self,
        parent: EntityRef,
    ) -> Result<IrradianceProbeRef, StoreError> {
        self.create(parent)
    }

    pub fn destroy_irradiance_probe(
        &mut self,
        probe: IrradianceProbeRef,
    ) -> Result<(), StoreError> {
        self.destroy(probe)
    }

    // Getter/Setter

    pub fn radius(&self, probe: IrradianceProbeRef) -> Result<f32, StoreError> {
        let (data, slot) = self.slot(probe)?;
        Ok(data.radius[slot])
    }

    pub fn radius_mut(&mut self, probe: IrradianceProbeRef) -> Result<&mut f32, StoreError> {
        let (data, slot) = self.slot_mut(probe)?;
        Ok(&mut data.radius[slot])
    }

    pub fn priority(&self, probe: IrradianceProbeRef) -> Result<u32, StoreError> {
        let (data, slot) = self.slot(probe)?;
        Ok(data.priority[slot])
    }

    pub fn priority_mut(&mut self, probe: IrradianceProbeRef) -> Result<&mut u32, StoreError> {
        let (data, slot) = self.slot_mut(probe)?;
        Ok(&mut data.priority[slot])
    }

    pub fn sh_day(&self, probe: IrradianceProbeRef) -> Result<&ShCoeffs, StoreError> {
        let (data, slot) = self.slot(probe)?;
        Ok(&data.sh_day[slot])
    }

    pub fn sh_day_mut(&mut self, probe: IrradianceProbeRef) -> Result<&mut ShCoeffs, StoreError> {
        let (data, slot) = self.slot_mut(probe)?;
        Ok(&mut data.sh_day[slot])
    }

    pub fn sh_night(&self, probe: IrradianceProbeRef) -> Result<&ShCoeffs, StoreError> {
        let (data, slot) = self.slot(probe)?;
        Ok(&data.sh_night[slot])
    }

    pub fn sh_night_mut(&mut self, probe: IrradianceProbeRef) -> Result<&mut ShCoeffs, StoreError> {
        let (data, slot) = self.slot_mut(probe)?;
        Ok(&mut data.sh_night[slot])
    }

    /// Order `probes` by ascending priority.
    ///
    /// Probes with equal priority come out in no particular order.
    pub fn sort_by_priority(&self, probes: &mut [IrradianceProbeRef]) -> Result<(), StoreError> {
        let _span = tracing::debug_span!(
            "sort_irradiance_probes",
            category = "General",
            count = probes.len()
        )
        .entered();
        self.sort_refs_by_key(probes, |data, slot| data.priority[slot])
    }

    /// [`sort_by_priority`](Self::sort_by_priority), also timed into `profiler`
    /// under [`SORT_SPAN`].
    pub fn sort_by_priority_profiled(
        &self,
        probes: &mut [IrradianceProbeRef],
        profiler: &mut SpanProfiler,
    ) -> Result<(), StoreError> {
        profiler.time_span(SORT_SPAN, || self.sort_by_priority(probes))
    }
}

impl ComponentDescriptor for ComponentManager<IrradianceProbeData> {
    type Data = IrradianceProbeData;

    fn compile_descriptor(
        &self,
        probe: IrradianceProbeRef,
        generate_desc: bool,
    ) -> Result<Properties, StoreError> {
        let (data, slot) = self.slot(probe)?;
        let mut props = PropertyWriter::new(IrradianceProbeData::NAME, generate_desc);
        props
            .float("radius", data.radius[slot], DEFAULT_RADIUS)
            .float("priority", data.priority[slot] as f32, DEFAULT_PRIORITY as f32)
            .sh("shDay", &data.sh_day[slot], &ShCoeffs::ZERO)
            .sh("shNight", &data.sh_night[slot], &ShCoeffs::ZERO);
        Ok(props.finish())
    }

    fn init_from_descriptor(
        &mut self,
        probe: IrradianceProbeRef,
        properties: &Properties,
    ) -> Result<(), DescriptorError> {
        let (data, slot) = self.slot_mut(probe)?;
        let mut props = PropertyReader::new(IrradianceProbeData::NAME, properties);

        if let Some(radius) = props.float("radius") {
            data.radius[slot] = radius;
        }
        // Priority is edited as a float; truncate toward zero
        // (negative and NaN saturate to 0).
        if let Some(priority) = props.float("priority") {
            data.priority[slot] = priority as u32;
        }
        if let Some(sh) = props.sh("shDay") {
            data.sh_day[slot] = sh;
        }
        if let Some(sh) = props.sh("shNight") {
            data.sh_night[slot] = sh;
        }

        props.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dod::FieldError;
    use crate::math::Vec3;
    use serde_json::{json, Value};

    fn owner(id: u64) -> EntityRef {
        EntityRef::from_raw(id)
    }

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn sh_ramp(offset: f32) -> ShCoeffs {
        let mut sh = ShCoeffs::ZERO;
        for (i, c) in sh.coefficients_mut().iter_mut().enumerate() {
            let base = offset + i as f32 * 0.1;
            *c = Vec3::new(base, -base, base / 3.0);
        }
        sh
    }

    #[test]
    fn new_probe_has_defaults() {
        let mut probes = IrradianceProbeManager::default();
        let p = probes.create_irradiance_probe(owner(1)).unwrap();
        assert_eq!(probes.radius(p), Ok(20.0));
        assert_eq!(probes.priority(p), Ok(0));
        assert_eq!(probes.sh_day(p), Ok(&ShCoeffs::ZERO));
        assert_eq!(probes.sh_night(p), Ok(&ShCoeffs::ZERO));
        assert_eq!(probes.capacity(), MAX_IRRADIANCE_PROBE_COUNT);
    }

    #[test]
    fn capacity_is_a_hard_ceiling() {
        let mut probes = IrradianceProbeManager::new(4);
        let refs: Vec<_> = (0..4)
            .map(|i| probes.create_irradiance_probe(owner(i)).unwrap())
            .collect();
        assert!(matches!(
            probes.create_irradiance_probe(owner(9)),
            Err(StoreError::CapacityExceeded { capacity: 4, .. })
        ));

        probes.destroy_irradiance_probe(refs[1]).unwrap();
        assert!(probes.create_irradiance_probe(owner(9)).is_ok());
    }

    #[test]
    fn reused_slot_gets_defaults_not_previous_values() {
        let mut probes = IrradianceProbeManager::new(8);
        let old = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.radius_mut(old).unwrap() = 3.0;
        *probes.priority_mut(old).unwrap() = 12;
        *probes.sh_day_mut(old).unwrap() = sh_ramp(1.0);
        *probes.sh_night_mut(old).unwrap() = sh_ramp(2.0);

        probes.destroy_irradiance_probe(old).unwrap();
        let new = probes.create_irradiance_probe(owner(2)).unwrap();

        assert_eq!(new.index(), old.index());
        assert_eq!(probes.radius(new), Ok(DEFAULT_RADIUS));
        assert_eq!(probes.priority(new), Ok(DEFAULT_PRIORITY));
        assert_eq!(probes.sh_day(new), Ok(&ShCoeffs::ZERO));
        assert_eq!(probes.sh_night(new), Ok(&ShCoeffs::ZERO));
        assert!(matches!(probes.radius(old), Err(StoreError::StaleHandle { .. })));
    }

    #[test]
    fn reset_to_default_restores_everything() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.radius_mut(p).unwrap() = 1.0;
        *probes.priority_mut(p).unwrap() = 4;
        *probes.sh_night_mut(p).unwrap() = sh_ramp(0.5);

        probes.reset_to_default(p).unwrap();
        assert!(probes.is_alive(p));
        assert_eq!(probes.radius(p), Ok(20.0));
        assert_eq!(probes.priority(p), Ok(0));
        assert_eq!(probes.sh_night(p), Ok(&ShCoeffs::ZERO));
    }

    #[test]
    fn descriptor_round_trip_is_bit_exact() {
        let mut probes = IrradianceProbeManager::new(4);
        let src = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.radius_mut(src).unwrap() = 0.1 + 0.2;
        *probes.priority_mut(src).unwrap() = 77;
        *probes.sh_day_mut(src).unwrap() = sh_ramp(0.3);
        *probes.sh_night_mut(src).unwrap() = sh_ramp(-7.7);

        // Through text as well, the way scene files store it
        let text = serde_json::to_string(&probes.compile_descriptor(src, false).unwrap()).unwrap();
        let desc: Properties = serde_json::from_str(&text).unwrap();

        let dst = probes.create_irradiance_probe(owner(2)).unwrap();
        probes.init_from_descriptor(dst, &desc).unwrap();

        assert_eq!(
            probes.radius(dst).unwrap().to_bits(),
            probes.radius(src).unwrap().to_bits()
        );
        assert_eq!(probes.priority(dst), Ok(77));
        assert!(probes.sh_day(dst).unwrap().bits_eq(probes.sh_day(src).unwrap()));
        assert!(probes.sh_night(dst).unwrap().bits_eq(probes.sh_night(src).unwrap()));
    }

    #[test]
    fn partial_descriptor_only_touches_present_fields() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.priority_mut(p).unwrap() = 6;
        *probes.sh_day_mut(p).unwrap() = sh_ramp(1.5);

        probes
            .init_from_descriptor(p, &props(json!({ "radius": 5.0 })))
            .unwrap();

        assert_eq!(probes.radius(p), Ok(5.0));
        assert_eq!(probes.priority(p), Ok(6));
        assert_eq!(probes.sh_day(p), Ok(&sh_ramp(1.5)));
        assert_eq!(probes.sh_night(p), Ok(&ShCoeffs::ZERO));
    }

    #[test]
    fn priority_truncates_toward_zero() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();

        probes
            .init_from_descriptor(p, &props(json!({ "priority": 3.9 })))
            .unwrap();
        assert_eq!(probes.priority(p), Ok(3));

        probes
            .init_from_descriptor(p, &props(json!({ "priority": -2.5 })))
            .unwrap();
        assert_eq!(probes.priority(p), Ok(0));
    }

    #[test]
    fn priority_overflow_saturates() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();

        probes
            .init_from_descriptor(p, &props(json!({ "priority": 1e12 })))
            .unwrap();
        assert_eq!(probes.priority(p), Ok(u32::MAX));

        probes
            .init_from_descriptor(p, &props(json!({ "priority": "NaN" })))
            .unwrap();
        assert_eq!(probes.priority(p), Ok(0));
    }

    #[test]
    fn snapshot_writes_priority_as_float() {
        let mut probes = IrradianceProbeManager::new(1);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.priority_mut(p).unwrap() = 5;

        let snapshot = probes.compile_descriptor(p, false).unwrap();
        assert_eq!(snapshot["priority"], json!(5.0));
        assert!(snapshot["priority"].is_f64());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.radius_mut(p).unwrap() = 7.5;
        *probes.priority_mut(p).unwrap() = 3;
        *probes.sh_day_mut(p).unwrap() = sh_ramp(0.25);

        let result = probes.init_from_descriptor(
            p,
            &props(json!({ "colour": "red", "Radius": 1.0, "shEvening": [] })),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(probes.radius(p), Ok(7.5));
        assert_eq!(probes.priority(p), Ok(3));
        assert_eq!(probes.sh_day(p), Ok(&sh_ramp(0.25)));
        assert_eq!(probes.sh_night(p), Ok(&ShCoeffs::ZERO));
    }

    #[test]
    fn non_finite_values_survive_text_round_trip() {
        let mut probes = IrradianceProbeManager::new(2);
        let src = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.radius_mut(src).unwrap() = f32::INFINITY;
        let mut day = sh_ramp(1.0);
        day.coefficients_mut()[0].x = f32::NAN;
        day.coefficients_mut()[4].z = f32::NEG_INFINITY;
        *probes.sh_day_mut(src).unwrap() = day;

        let text = serde_json::to_string(&probes.compile_descriptor(src, false).unwrap()).unwrap();
        let desc: Properties = serde_json::from_str(&text).unwrap();

        let dst = probes.create_irradiance_probe(owner(2)).unwrap();
        probes.init_from_descriptor(dst, &desc).unwrap();

        assert_eq!(probes.radius(dst), Ok(f32::INFINITY));
        let got = probes.sh_day(dst).unwrap();
        assert!(got.coefficients()[0].x.is_nan());
        assert_eq!(got.coefficients()[4].z, f32::NEG_INFINITY);
        assert_eq!(got.coefficients()[1], day.coefficients()[1]);
    }

    #[test]
    fn malformed_field_does_not_block_siblings() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();

        let result = probes.init_from_descriptor(
            p,
            &props(json!({
                "radius": "wide",
                "priority": 9,
                "shNight": [[1.0, 1.0, 1.0]]
            })),
        );

        let Err(DescriptorError::MalformedFields(errors)) = &result else {
            panic!("expected malformed fields, got {result:?}");
        };
        let fields: Vec<&str> = errors.iter().map(|e: &FieldError| e.field.as_str()).collect();
        assert_eq!(fields, ["radius", "shNight"]);
        assert_eq!(probes.radius(p), Ok(DEFAULT_RADIUS));
        assert_eq!(probes.priority(p), Ok(9));
        assert_eq!(probes.sh_night(p), Ok(&ShCoeffs::ZERO));
    }

    #[test]
    fn schema_output_describes_defaults() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();
        *probes.radius_mut(p).unwrap() = 99.0;

        let schema = probes.compile_descriptor(p, true).unwrap();
        assert_eq!(
            schema["radius"],
            json!({
                "cat": "IrradianceProbe",
                "editor": "float",
                "value": 20.0,
                "readOnly": false,
                "internal": false
            })
        );
        assert_eq!(schema["priority"]["value"], json!(0.0));
        assert_eq!(schema["shDay"]["editor"], json!("sh"));
        assert_eq!(schema.len(), 4);

        // Applying a schema resets the probe to its defaults
        probes.init_from_descriptor(p, &schema).unwrap();
        assert_eq!(probes.radius(p), Ok(DEFAULT_RADIUS));
    }

    #[test]
    fn descriptor_on_stale_ref_fails() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();
        probes.destroy_irradiance_probe(p).unwrap();

        assert!(probes.compile_descriptor(p, false).is_err());
        assert!(matches!(
            probes.init_from_descriptor(p, &Properties::new()),
            Err(DescriptorError::Store(StoreError::StaleHandle { .. }))
        ));
    }

    #[test]
    fn sort_by_priority_orders_ascending_without_touching_columns() {
        let priorities = [4u32, 1, 4, 0, 9, 2, 2];
        let mut probes = IrradianceProbeManager::new(16).with_parallel_sort_threshold(2);
        let mut refs: Vec<_> = priorities
            .iter()
            .enumerate()
            .map(|(i, &prio)| {
                let p = probes.create_irradiance_probe(owner(i as u64)).unwrap();
                *probes.priority_mut(p).unwrap() = prio;
                p
            })
            .collect();
        let columns_before = probes.data().priority.as_slice().to_vec();

        let mut profiler = SpanProfiler::new();
        probes.sort_by_priority_profiled(&mut refs, &mut profiler).unwrap();

        let sorted: Vec<u32> = refs.iter().map(|&r| probes.priority(r).unwrap()).collect();
        assert_eq!(sorted, vec![0, 1, 2, 2, 4, 4, 9]);
        assert_eq!(probes.data().priority.as_slice(), columns_before.as_slice());
        assert_eq!(probes.data().priority.len(), 16);
    }

    #[test]
    fn sort_handles_empty_and_single() {
        let mut probes = IrradianceProbeManager::new(2);
        let p = probes.create_irradiance_probe(owner(1)).unwrap();

        let mut none: Vec<IrradianceProbeRef> = Vec::new();
        probes.sort_by_priority(&mut none).unwrap();
        assert!(none.is_empty());

        let mut one = vec![p];
        probes.sort_by_priority(&mut one).unwrap();
        assert_eq!(one, vec![p]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // NaN is covered separately; it comes back canonical, not bit-exact
        fn non_nan() -> impl Strategy<Value = f32> {
            prop::num::f32::NORMAL
                | prop::num::f32::SUBNORMAL
                | prop::num::f32::ZERO
                | prop::num::f32::INFINITE
        }

        fn sh_block() -> impl Strategy<Value = ShCoeffs> {
            prop::array::uniform9(prop::array::uniform3(non_nan())).prop_map(ShCoeffs::from_arrays)
        }

        proptest! {
            #[test]
            fn sorted_output_is_non_decreasing(
                priorities in prop::collection::vec(0u32..64, 0..300),
                threshold in 2usize..512,
            ) {
                let mut probes = IrradianceProbeManager::new(priorities.len().max(1))
                    .with_parallel_sort_threshold(threshold);
                let mut refs = Vec::with_capacity(priorities.len());
                for (i, &prio) in priorities.iter().enumerate() {
                    let p = probes.create_irradiance_probe(owner(i as u64)).unwrap();
                    *probes.priority_mut(p).unwrap() = prio;
                    refs.push(p);
                }
                let mut expected = refs.clone();
                expected.sort_by_key(|r| r.to_bits());

                probes.sort_by_priority(&mut refs).unwrap();

                let sorted: Vec<u32> = refs.iter().map(|&r| probes.priority(r).unwrap()).collect();
                prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));

                // Same multiset of refs, just reordered
                let mut got = refs.clone();
                got.sort_by_key(|r| r.to_bits());
                prop_assert_eq!(got, expected);
            }

            #[test]
            fn snapshot_round_trips(
                radius in non_nan(),
                priority in 0u32..(1 << 24),
                day in sh_block(),
                night in sh_block(),
            ) {
                let mut probes = IrradianceProbeManager::new(2);
                let src = probes.create_irradiance_probe(owner(1)).unwrap();
                *probes.radius_mut(src).unwrap() = radius;
                *probes.priority_mut(src).unwrap() = priority;
                *probes.sh_day_mut(src).unwrap() = day;
                *probes.sh_night_mut(src).unwrap() = night;

                let desc = probes.compile_descriptor(src, false).unwrap();
                let dst = probes.create_irradiance_probe(owner(2)).unwrap();
                probes.init_from_descriptor(dst, &desc).unwrap();

                prop_assert_eq!(probes.radius(dst).unwrap().to_bits(), radius.to_bits());
                prop_assert_eq!(probes.priority(dst).unwrap(), priority);
                prop_assert!(probes.sh_day(dst).unwrap().bits_eq(&day));
                prop_assert!(probes.sh_night(dst).unwrap().bits_eq(&night));
            }
        }
    }
}

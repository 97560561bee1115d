/// PROPERTY-BASED TESTS: values survive the trip through the shared data
/// channel and the viewport's FOV / plane conversion

use glam::{Quat, Vec2};
use proptest::prelude::*;

use concord_projection::{BaseViewport, UserRegistry};
use concord_shared::{
    decode_frame, encode_frame, CompressionMode, Decoder, Encoder, FrameCodec, SerdeErr,
    SharedData,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Mixed {
    count: u32,
    offset: i64,
    flag: bool,
    scale: f32,
    time: f64,
    name: String,
    samples: Vec<u16>,
}

impl FrameCodec for Mixed {
    fn encode(&mut self, data: &mut SharedData) {
        data.write(&self.count);
        data.write(&self.offset);
        data.write(&self.flag);
        data.write(&self.scale);
        data.write(&self.time);
        data.write(&self.name);
        data.write(&self.samples);
    }

    fn decode(&mut self, data: &mut SharedData) -> Result<(), SerdeErr> {
        self.count = data.read()?;
        self.offset = data.read()?;
        self.flag = data.read()?;
        self.scale = data.read()?;
        self.time = data.read()?;
        self.name = data.read()?;
        self.samples = data.read()?;
        Ok(())
    }
}

fn mixed_strategy() -> impl Strategy<Value = Mixed> {
    (
        any::<u32>(),
        any::<i64>(),
        any::<bool>(),
        any::<u32>(),
        any::<u64>(),
        ".{0,24}",
        prop::collection::vec(any::<u16>(), 0..32),
    )
        .prop_map(|(count, offset, flag, scale_bits, time_bits, name, samples)| Mixed {
            count,
            offset,
            flag,
            // any bit pattern, NaN payloads included
            scale: f32::from_bits(scale_bits),
            time: f64::from_bits(time_bits),
            name,
            samples,
        })
}

fn viewport() -> BaseViewport {
    let users = UserRegistry::new();
    BaseViewport::new(Vec2::ZERO, Vec2::ONE, users.default_key()).unwrap()
}

proptest! {
    #[test]
    fn prop_channel_round_trip_is_exact(value in mixed_strategy(), master_time in any::<u64>()) {
        let master_time = f64::from_bits(master_time);
        let mut source = value.clone();
        let mut data = SharedData::new();
        encode_frame(&mut data, master_time, &mut source, true);

        let mut encoder = Encoder::try_new(&CompressionMode::default()).unwrap();
        let mut decoder = Decoder::try_new(&CompressionMode::default()).unwrap();
        let uncompressed = data.encoded().to_vec();
        let payload = encoder.try_encode(&uncompressed).unwrap().to_vec();
        let bytes = decoder.try_decode(&payload, uncompressed.len()).unwrap().to_vec();

        let mut received = Mixed::default();
        let mut incoming = SharedData::new();
        let stamp = decode_frame(&mut incoming, &bytes, &mut received, 0, "master", false, |_| {}).unwrap();

        prop_assert_eq!(stamp.master_time.to_bits(), master_time.to_bits());
        prop_assert!(stamp.has_state);
        prop_assert_eq!(received.count, value.count);
        prop_assert_eq!(received.offset, value.offset);
        prop_assert_eq!(received.flag, value.flag);
        prop_assert_eq!(received.scale.to_bits(), value.scale.to_bits());
        prop_assert_eq!(received.time.to_bits(), value.time.to_bits());
        prop_assert_eq!(received.name, value.name);
        prop_assert_eq!(received.samples, value.samples);
    }

    #[test]
    fn prop_horizontal_fov_round_trip(degrees in 0.01f32..179.99f32, aspect in 0.25f32..4.0f32) {
        let mut viewport = viewport();
        viewport.set_horizontal_fov(degrees, aspect).unwrap();

        let measured = viewport.horizontal_fov_degrees();
        prop_assert!(
            ((measured - degrees) / degrees).abs() < 1e-4,
            "set {} measured {}", degrees, measured
        );
    }

    #[test]
    fn prop_symmetric_fov_plane_is_centered(
        half_width in 1.0f32..80.0f32,
        half_height in 1.0f32..80.0f32,
        distance in 0.1f32..50.0f32,
    ) {
        let mut viewport = viewport();
        viewport
            .set_view_plane_coords_using_fovs(
                half_height,
                -half_height,
                -half_width,
                half_width,
                Quat::IDENTITY,
                distance,
            )
            .unwrap();

        let center = viewport.plane().center();
        prop_assert!(center.x.abs() < 1e-3 * distance.max(1.0));
        prop_assert!(center.y.abs() < 1e-3 * distance.max(1.0));
        prop_assert!((center.z + distance).abs() < 1e-4 * distance.max(1.0));

        let measured = viewport.horizontal_fov_degrees();
        prop_assert!(((measured - 2.0 * half_width) / (2.0 * half_width)).abs() < 1e-4);
    }
}

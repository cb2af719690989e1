// ============================================================================
// INTEGRATION TESTS
// ============================================================================
// Full generate/parse roundtrips at the default 44.1 kHz rate. Each FSK bit
// is one 308-sample FFT, so these run quickly even in debug mode.
// ============================================================================

use audiocode_core::fec::FecEncoder;
use audiocode_core::fsk::{FskDemodulator, FskModulator};
use audiocode_core::nfe::{nfe_frequency, nfe_modulus};
use audiocode_core::{
    bits_from_data, BitSource, CodecError, Decoder, Encoder, FramedMessage, FskParams,
    ModulationConfig, RS_ECC_BYTES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

#[test]
fn test_fsk_end_to_end_default() {
    init_logging();
    let config = ModulationConfig::fsk();

    let encoder = Encoder::new(config).expect("Failed to create encoder");
    let (samples, info) = encoder
        .generate(&FramedMessage::from_u16(1234))
        .expect("Failed to generate");
    println!("{}", info);

    let decoder = Decoder::new(config).expect("Failed to create decoder");
    let message = decoder.parse(&samples).expect("Failed to parse");

    assert_eq!(message.as_u16().unwrap(), 1234);
    assert_eq!(message.length(), 2);
}

#[test]
fn test_fsk_text_roundtrip() {
    let config = ModulationConfig::fsk();
    let original = "Hello, audio code!";

    let encoder = Encoder::new(config).unwrap();
    let (samples, _) = encoder
        .generate(&FramedMessage::from_text(original).unwrap())
        .unwrap();

    let decoder = Decoder::new(config).unwrap();
    let message = decoder.parse(&samples).unwrap();
    assert_eq!(message.as_text().unwrap(), original);
}

#[test]
fn test_fsk_binary_payload_with_custom_frequencies() {
    let config = ModulationConfig::fsk().with_frequencies(2000.0, 6000.0);
    let original = vec![0u8, 1, 2, 255, 128, 64, 32, 16, 8, 4, 2, 1, 0];

    let encoder = Encoder::new(config).unwrap();
    let (samples, _) = encoder
        .generate(&FramedMessage::from_bytes(original.clone()).unwrap())
        .unwrap();

    let message = Decoder::new(config).unwrap().parse(&samples).unwrap();
    assert_eq!(message.payload(), &original[..]);
}

#[test]
fn test_fsk_max_payload() {
    let config = ModulationConfig::fsk();
    let original = vec![42u8; 255];

    let encoder = Encoder::new(config).unwrap();
    let (samples, info) = encoder
        .generate(&FramedMessage::from_bytes(original.clone()).unwrap())
        .unwrap();
    // 257 framed bytes span two RS blocks
    assert_eq!(info.bit_count(), Some((257 + 2 * RS_ECC_BYTES) * 8));

    let message = Decoder::new(config).unwrap().parse(&samples).unwrap();
    assert_eq!(message.payload(), &original[..]);
}

#[test]
fn test_fsk_survives_additive_noise() {
    init_logging();
    let config = ModulationConfig::fsk();
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0f32, 0.1).unwrap();

    let encoder = Encoder::new(config).unwrap();
    let (samples, _) = encoder
        .generate(&FramedMessage::from_u32(0xDEAD_BEEF))
        .unwrap();
    let noisy: Vec<f32> = samples.iter().map(|&s| s + noise.sample(&mut rng)).collect();

    let message = Decoder::new(config).unwrap().parse(&noisy).unwrap();
    assert_eq!(message.as_u32().unwrap(), 0xDEAD_BEEF);
}

#[test]
fn test_fsk_with_guard_tones() {
    // Guard tones far from both data tones are excluded from the data window
    let config = ModulationConfig::fsk()
        .with_pre_guard(0.1, 1780.0)
        .with_post_guard(0.1, 3571.0);

    let encoder = Encoder::new(config).unwrap();
    let (samples, _) = encoder.generate(&FramedMessage::from_u16(4321)).unwrap();

    let message = Decoder::new(config).unwrap().parse(&samples).unwrap();
    assert_eq!(message.as_u16().unwrap(), 4321);
}

#[test]
fn test_fsk_guard_tones_on_data_frequencies() {
    // Guards sit exactly on f0 and f1; only the window cut keeps them out
    let config = ModulationConfig::fsk()
        .with_pre_guard(0.1, 1000.0)
        .with_post_guard(0.1, 5000.0);

    let encoder = Encoder::new(config).unwrap();
    let (samples, _) = encoder.generate(&FramedMessage::from_u16(1234)).unwrap();

    let message = Decoder::new(config).unwrap().parse(&samples).unwrap();
    assert_eq!(message.as_u16().unwrap(), 1234);

    // Untrimmed, the guard bursts classify as data bits
    let demodulator = FskDemodulator::new(config.signal, FskParams::default());
    let raw_bits = demodulator.demodulate(&samples);
    assert!(raw_bits.len() > 64);
}

#[test]
fn test_fsk_without_error_correction() {
    let config = ModulationConfig::fsk();
    let encoder = Encoder::new(config).unwrap();
    let (samples, info) = encoder
        .generate(&FramedMessage::from_u64(99).with_error_correction(false))
        .unwrap();
    assert_eq!(info.bit_count(), Some((2 + 8) * 8));

    let decoder = Decoder::new(config).unwrap().with_error_correction(false);
    assert_eq!(decoder.parse(&samples).unwrap().as_u64().unwrap(), 99);
}

#[test]
fn test_volume_normalization() {
    let message = FramedMessage::from_u16(1234);

    let full = Encoder::new(ModulationConfig::fsk().with_volume(1.0)).unwrap();
    let (samples, _) = full.generate(&message).unwrap();
    assert!((peak(&samples) - 1.0).abs() < 1e-6);

    let half = Encoder::new(ModulationConfig::fsk().with_volume(0.5)).unwrap();
    let (samples, _) = half.generate(&message).unwrap();
    assert!(peak(&samples) <= 0.5);

    let nfe = Encoder::new(ModulationConfig::nfe().with_volume(1.0)).unwrap();
    let (samples, _) = nfe.generate(&message).unwrap();
    assert!((peak(&samples) - 1.0).abs() < 1e-6);
}

#[test]
fn test_nfe_range_property() {
    let (f0, f1, df) = (1000.0, 5000.0, 100.0);
    let modulus = nfe_modulus(f0, f1, df);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..1000 {
        let a: u64 = rng.gen();
        let b: u64 = rng.gen();
        let fa = nfe_frequency(a, f0, f1, df);
        let fb = nfe_frequency(b, f0, f1, df);

        assert!((f0..=f1).contains(&fa), "{} -> {} Hz", a, fa);
        if a % modulus != b % modulus {
            assert!((fa - fb).abs() >= df - 1e-9, "{} and {} too close", a, b);
        }
    }

    // Values one modulus apart collide
    assert_eq!(nfe_frequency(5, f0, f1, df), nfe_frequency(5 + modulus, f0, f1, df));
}

#[test]
fn test_nfe_generate_value_and_message_agree() {
    let encoder = Encoder::new(ModulationConfig::nfe()).unwrap();
    let (by_message, info) = encoder.generate(&FramedMessage::from_u64(2024)).unwrap();
    let (by_value, _) = encoder.generate_value(2024).unwrap();

    assert_eq!(by_message, by_value);
    assert_eq!(info.nfe_frequency(), Some(1000.0 + (2024 % 41) as f64 * 100.0));
    assert_eq!(by_message.len(), 4410 + 22050 + 4410);
}

#[test]
fn test_nfe_cannot_be_parsed() {
    assert!(matches!(
        Decoder::new(ModulationConfig::nfe()),
        Err(CodecError::UnsupportedCodec(_))
    ));
}

#[test]
fn test_fec_corrects_two_symbols() {
    let message = FramedMessage::from_bytes(b"\x01\x02".to_vec()).unwrap();
    let mut encoded = message.encode();
    encoded[0] ^= 0x5A;
    encoded[5] ^= 0xFF;

    let decoded = FramedMessage::decode(&encoded, true).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn test_checksum_failure_beyond_fec_budget() {
    let message = FramedMessage::from_bytes(b"\x01\x02".to_vec()).unwrap();
    assert_eq!(message.checksum(), audiocode_core::crc8(b"\x01\x02"));

    let mut encoded = message.encode();
    for byte in encoded.iter_mut().take(3) {
        *byte ^= 0xFF;
    }

    let err = FramedMessage::decode(&encoded, true).unwrap_err();
    assert!(err.is_integrity(), "expected integrity error, got {:?}", err);
}

#[test]
fn test_corrupted_audio_is_repaired() {
    // Render a frame with two damaged bytes straight to tones, no guards
    let config = ModulationConfig::fsk().with_pre_guard(0.0, 0.0).with_post_guard(0.0, 0.0);
    let modulator = FskModulator::new(config.signal, FskParams::default());

    let mut encoded = FramedMessage::from_u16(1234).encode();
    encoded[2] ^= 0x81;
    encoded[6] ^= 0x10;
    let bits = bits_from_data(BitSource::Bytes(&encoded)).unwrap();
    let samples = modulator.modulate(&bits);

    let message = Decoder::new(config).unwrap().parse(&samples).unwrap();
    assert_eq!(message.as_u16().unwrap(), 1234);
}

#[test]
fn test_fec_buffer_lengths() {
    let encoder = FecEncoder::new();
    assert_eq!(encoder.encode(&[0u8; 10]).len(), 10 + RS_ECC_BYTES);
}

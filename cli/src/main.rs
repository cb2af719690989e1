use audiocode_core::pcm::{downmix, from_pcm16, to_pcm16};
use audiocode_core::{
    bits_from_data, bits_to_string, CodecError, Decoder, Encoder, FramedMessage, FskParams,
    ModulationConfig, NfeParams, Scheme,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hound::{SampleFormat, WavSpec};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),

    #[error("Unsupported WAV sample format: {0}")]
    UnsupportedWav(String),
}

#[derive(Parser)]
#[command(name = "audiocode")]
#[command(about = "Encode short payloads as audio tones and decode them back")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a payload to a WAV audio file
    Generate {
        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        #[command(flatten)]
        payload: PayloadArgs,

        #[command(flatten)]
        signal: SignalArgs,

        /// Print the signal description as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an FSK WAV audio file
    Parse {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        #[command(flatten)]
        signal: SignalArgs,

        /// How to print the decoded payload
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the framed bit string for a payload
    Bits {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Frame without Reed-Solomon parity
        #[arg(long)]
        no_ecc: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PayloadArgs {
    /// 16-bit unsigned integer payload
    #[arg(long)]
    uint16: Option<u16>,

    /// 32-bit unsigned integer payload
    #[arg(long)]
    uint32: Option<u32>,

    /// 64-bit unsigned integer payload
    #[arg(long)]
    uint64: Option<u64>,

    /// UTF-8 text payload
    #[arg(long)]
    text: Option<String>,

    /// Raw bytes as a hex string
    #[arg(long)]
    hex: Option<String>,

    /// Raw bytes read from a file
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct SignalArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long, value_name = "FILE.json")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    codec: Option<CodecArg>,

    /// Frequency for bit 0 / lowest NFE frequency (Hz)
    #[arg(long)]
    f0: Option<f64>,

    /// Frequency for bit 1 / highest NFE frequency (Hz)
    #[arg(long)]
    f1: Option<f64>,

    /// NFE frequency step (Hz)
    #[arg(long)]
    df: Option<f64>,

    #[arg(long)]
    sample_rate: Option<u32>,

    /// Seconds per FSK bit
    #[arg(long)]
    bit_duration: Option<f64>,

    /// Seconds the NFE tone is held
    #[arg(long)]
    tone_duration: Option<f64>,

    /// Amplitude 0..1 (1.0 normalizes to full scale)
    #[arg(long)]
    volume: Option<f64>,

    #[arg(long)]
    pre_delay: Option<f64>,

    #[arg(long)]
    pre_frequency: Option<f64>,

    #[arg(long)]
    post_delay: Option<f64>,

    #[arg(long)]
    post_frequency: Option<f64>,

    /// Disable Reed-Solomon error correction
    #[arg(long)]
    no_ecc: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CodecArg {
    Fsk,
    Nfe,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Hex,
    Uint,
}

impl PayloadArgs {
    fn to_message(&self, use_error_correction: bool) -> Result<FramedMessage, CliError> {
        let message = if let Some(value) = self.uint16 {
            FramedMessage::from_u16(value)
        } else if let Some(value) = self.uint32 {
            FramedMessage::from_u32(value)
        } else if let Some(value) = self.uint64 {
            FramedMessage::from_u64(value)
        } else if let Some(text) = &self.text {
            FramedMessage::from_text(text)?
        } else if let Some(hex) = &self.hex {
            FramedMessage::from_bytes(parse_hex(hex)?)?
        } else if let Some(path) = &self.input {
            FramedMessage::from_bytes(std::fs::read(path)?)?
        } else {
            FramedMessage::from_bytes(Vec::new())?
        };
        Ok(message.with_error_correction(use_error_correction))
    }
}

impl SignalArgs {
    fn resolve(&self) -> Result<ModulationConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str::<ModulationConfig>(&text)?
            }
            None => ModulationConfig::default(),
        };

        match (self.codec, config.scheme) {
            (Some(CodecArg::Fsk), Scheme::Nfe(_)) => config.scheme = Scheme::Fsk(FskParams::default()),
            (Some(CodecArg::Nfe), Scheme::Fsk(_)) => config.scheme = Scheme::Nfe(NfeParams::default()),
            _ => {}
        }

        let signal = &mut config.signal;
        override_with(&mut signal.f0, self.f0);
        override_with(&mut signal.f1, self.f1);
        override_with(&mut signal.sample_rate, self.sample_rate);
        override_with(&mut signal.volume, self.volume);
        override_with(&mut signal.pre_delay, self.pre_delay);
        override_with(&mut signal.pre_frequency, self.pre_frequency);
        override_with(&mut signal.post_delay, self.post_delay);
        override_with(&mut signal.post_frequency, self.post_frequency);

        match &mut config.scheme {
            Scheme::Fsk(params) => {
                override_with(&mut params.bit_duration, self.bit_duration);
            }
            Scheme::Nfe(params) => {
                override_with(&mut params.frequency_step, self.df);
                override_with(&mut params.tone_duration, self.tone_duration);
            }
        }

        Ok(config)
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_hex(text: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = text
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if !digits.is_ascii() {
        return Err(CliError::InvalidHex(format!("non-ASCII characters in {:?}", text)));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::InvalidHex(format!("odd number of digits in {:?}", text)));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| CliError::InvalidHex(format!("{:?} is not a hex byte", &digits[i..i + 2])))
        })
        .collect()
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Generate {
            output,
            payload,
            signal,
            json,
        } => generate_command(&output, &payload, &signal, json)?,
        Commands::Parse {
            input,
            signal,
            format,
        } => parse_command(&input, &signal, format)?,
        Commands::Bits { payload, no_ecc } => bits_command(&payload, no_ecc)?,
    }

    Ok(())
}

fn generate_command(
    output_path: &Path,
    payload: &PayloadArgs,
    signal: &SignalArgs,
    json: bool,
) -> Result<(), CliError> {
    let config = signal.resolve()?;
    let message = payload.to_message(!signal.no_ecc)?;

    let encoder = Encoder::new(config)?;
    let (samples, info) = encoder.generate(&message)?;
    log::info!("Encoded {} payload bytes to {} audio samples", message.length(), samples.len());

    write_wav(output_path, &samples, config.signal.sample_rate)?;
    log::info!("Wrote {}", output_path.display());

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info);
    }
    Ok(())
}

fn parse_command(input_path: &Path, signal: &SignalArgs, format: OutputFormat) -> Result<(), CliError> {
    let mut config = signal.resolve()?;
    let (samples, sample_rate) = read_wav(input_path)?;
    log::info!("Read {} samples from {}", samples.len(), input_path.display());

    if sample_rate != config.signal.sample_rate {
        log::warn!(
            "WAV sample rate {} Hz differs from configured {} Hz, using the file's rate",
            sample_rate,
            config.signal.sample_rate
        );
        config.signal.sample_rate = sample_rate;
    }

    let decoder = Decoder::new(config)?.with_error_correction(!signal.no_ecc);
    let message = decoder.parse(&samples)?;
    log::info!("Decoded {} payload bytes", message.length());

    match format {
        OutputFormat::Text => println!("{}", message.as_text()?),
        OutputFormat::Hex => {
            let hex: String = message.payload().iter().map(|b| format!("{:02x}", b)).collect();
            println!("{}", hex);
        }
        OutputFormat::Uint => println!("{}", message.as_uint()?),
    }
    Ok(())
}

fn bits_command(payload: &PayloadArgs, no_ecc: bool) -> Result<(), CliError> {
    let message = payload.to_message(!no_ecc)?;
    let bits = bits_from_data(&message)?;
    println!("{}", bits_to_string(&bits));
    Ok(())
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CliError> {
    // Write WAV file (16-bit PCM)
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let file = File::create(path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;
    for sample in to_pcm16(samples) {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Mono samples on [-1, 1] and the file's sample rate.
fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), CliError> {
    let file = File::open(path)?;
    let mut reader = hound::WavReader::new(file)?;
    let spec = reader.spec();

    let interleaved = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => {
            let int_samples = reader.samples::<i16>().collect::<Result<Vec<i16>, _>>()?;
            from_pcm16(&int_samples)
        }
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<f32>, _>>()?,
        (format, bits) => {
            return Err(CliError::UnsupportedWav(format!("{:?} {}-bit", format, bits)));
        }
    };

    if spec.channels > 1 {
        log::debug!("downmixing {} channels to mono", spec.channels);
    }
    let samples = downmix(&interleaved, spec.channels as usize)?;
    Ok((samples, spec.sample_rate))
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!(
        "The plsynth CLI requires the \"cli\" feature. Rebuild with `--features cli` to enable script replay."
    );
}

#[cfg(feature = "cli")]
mod cli {
    use std::env;

    use anyhow::{bail, Context};
    use log::LevelFilter;
    use plsynth::registers::{AudioControl, CommonRegister};
    use plsynth::{
        load_script, EngineConfig, MemoryRegisterFile, RegisterTransport, SynthDevice,
        VoiceEngine,
    };

    const NOTE_NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    const USAGE: &str = "Usage:\n  plsynth [--units N] [--channels N] [--config FILE] [-v] <script>\n\nFlags:\n  --units N        Number of voice units (1-32, default 32)\n  --channels N     Number of channels (1-16, default 16)\n  --config FILE    Load engine configuration from a JSON file\n  -v               Verbose logging (repeat for trace)\n  -h, --help       Show this help\n";

    fn note_label(note: u8) -> String {
        let octave = note as i32 / 12 - 1;
        format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
    }

    #[derive(Default)]
    struct Options {
        script: Option<String>,
        config: Option<String>,
        units: Option<usize>,
        channels: Option<usize>,
        verbosity: u8,
        help: bool,
    }

    fn parse_count(flag: &str, value: Option<String>) -> anyhow::Result<usize> {
        let value = value.with_context(|| format!("{flag} requires an argument"))?;
        value
            .parse()
            .with_context(|| format!("invalid value for {flag}: {value}"))
    }

    fn parse_args() -> anyhow::Result<Options> {
        let mut options = Options::default();
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => options.help = true,
                "-v" => options.verbosity += 1,
                "-vv" => options.verbosity += 2,
                "--units" => options.units = Some(parse_count("--units", args.next())?),
                "--channels" => options.channels = Some(parse_count("--channels", args.next())?),
                "--config" => {
                    options.config = Some(args.next().context("--config requires an argument")?);
                }
                _ if arg.starts_with('-') => bail!("unknown flag: {arg}"),
                _ => options.script = Some(arg),
            }
        }
        Ok(options)
    }

    fn init_logging(verbosity: u8) {
        let level = match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }

    fn print_unit_table(engine: &VoiceEngine<MemoryRegisterFile>) {
        let regs = engine.transport();
        println!("Unit  Freq   Wave      Trig  A   D   S   R    AmpL   AmpR  Owner");
        for unit in 0..engine.pool().capacity() {
            let image = regs.read_unit(unit);
            let owner = engine
                .pool()
                .binding(unit)
                .map(|b| format!("ch{:<2} {:<4} vel {}", b.channel, note_label(b.note), b.velocity))
                .unwrap_or_else(|| "--".to_string());
            println!(
                "{:>4}  {:>5}  {:<8}  {:<4}  {:02X}  {:02X}  {:02X}  {:02X}  {:>5}  {:>5}  {}",
                unit,
                image.frequency,
                image.wave_type.to_string(),
                if image.trigger { "on" } else { "off" },
                image.envelope.attack,
                image.envelope.decay,
                image.envelope.sustain,
                image.envelope.release,
                image.amp_left,
                image.amp_right,
                owner,
            );
        }
    }

    fn print_summary(engine: &VoiceEngine<MemoryRegisterFile>) {
        let pool = engine.pool();
        let layout = engine.transport().layout();
        let audio = AudioControl::from_bits_truncate(
            engine
                .transport()
                .read_word(layout.common_register(CommonRegister::AudioControl)),
        );
        let busy_reg = engine
            .transport()
            .read_word(layout.common_register(CommonRegister::UnitBusy));

        println!("\n=== Pool ===");
        println!("Units busy:        {}/{}", pool.busy_count(), pool.capacity());
        println!("Busy mask:         {:#010x}", pool.busy_mask());
        println!("Busy register:     {busy_reg:#010x}");
        println!(
            "Audio clock sel:   {}",
            if audio.contains(AudioControl::AUDIO_CLK_SEL) { "set" } else { "clear" }
        );
        for channel in 0..engine.channel_count() as u8 {
            let sounding = engine.sounding_count(channel);
            if sounding > 0 {
                println!("Channel {channel:>2}:        {sounding} sounding");
            }
        }
        println!("Register writes:   {}", engine.transport().write_count());
    }

    pub fn run() -> anyhow::Result<()> {
        let options = parse_args()?;
        let script_path = match options.script {
            Some(path) if !options.help => path,
            _ => {
                eprint!("{USAGE}");
                return Ok(());
            }
        };
        init_logging(options.verbosity);

        let mut config = match &options.config {
            Some(path) => EngineConfig::from_file(path)
                .with_context(|| format!("failed to load config '{path}'"))?,
            None => EngineConfig::default(),
        };
        if let Some(units) = options.units {
            config.unit_count = units;
        }
        if let Some(channels) = options.channels {
            config.channel_count = channels;
            if config.drum_channel.is_some_and(|drum| drum as usize >= channels) {
                config.drum_channel = None;
            }
        }

        let events = load_script(&script_path)
            .with_context(|| format!("failed to read script '{script_path}'"))?;

        let device = SynthDevice::open(config, MemoryRegisterFile::new(config.unit_count))
            .context("failed to open voice engine")?;
        device.subscribe()?;

        println!("Replaying {} events from {script_path}\n", events.len());
        device.handle_events(events);

        device.with_engine(|engine| -> anyhow::Result<()> {
            print_unit_table(engine);
            print_summary(engine);
            engine.check_invariants()?;
            Ok(())
        })?;

        device.unsubscribe();
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}

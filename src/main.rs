use clap::{Parser, Subcommand, ValueEnum};
use harmonia::audio::{arpeggio_plan, chord_plan, plan_length_secs, LogOutput, Player};
use harmonia::circle::slots;
use harmonia::config::Settings;
use harmonia::keyboard::keyboard;
use harmonia::{
    chord_to_musicxml, layout_chord, resolve, resolve_symbol, signature_for, ChordDefinition, Key,
    KeySignature,
};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "harmonia", about = "Chord spelling, staff layout and the circle of fifths")]
#[command(version)]
struct Cli {
    /// YAML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Spell a chord and show where it sits on the staff and keyboard
    Chord {
        /// Chord symbol such as "Gm7"; defaults to the configured chord
        symbol: Option<String>,

        /// Print the chord as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the circle of fifths
    Circle,

    /// Show the key signature of a key ("Eb", "F#m")
    Key { key: String },

    /// Play a chord through the log output
    Play {
        symbol: Option<String>,

        /// Play note by note before the full chord
        #[arg(long)]
        arpeggio: bool,
    },

    /// Write a chord to a MIDI or MusicXML file
    Export {
        symbol: String,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportFormat::Midi)]
        format: ExportFormat,

        /// Export the arpeggio instead of the block chord (MIDI only)
        #[arg(long)]
        arpeggio: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Midi,
    Musicxml,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let settings = match &cli.config {
        Some(path) => Settings::load(path).unwrap_or_else(|e| {
            eprintln!("Error reading settings '{}': {}", path.display(), e);
            process::exit(1);
        }),
        None => Settings::default(),
    };

    match cli.command {
        Command::Chord { symbol, json } => {
            let chord = chord_or_default(symbol.as_deref(), &settings);
            if json {
                match serde_json::to_string_pretty(&chord) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error encoding chord: {}", e);
                        process::exit(1);
                    }
                }
            } else {
                print_chord(&chord);
            }
        }
        Command::Circle => {
            for slot in slots() {
                println!(
                    "{:>2}  {:>3}  {:<3} {:<3}  {}",
                    slot.index,
                    slot.angle_degrees,
                    slot.major.as_str(),
                    format!("{}m", slot.minor),
                    describe_signature(&signature_for(Key::major(slot.major)))
                );
            }
        }
        Command::Key { key } => {
            let key: Key = key.parse().unwrap_or_else(|e| {
                eprintln!("{}", e);
                process::exit(1);
            });
            let signature = signature_for(key);
            println!("{}: {}", key, describe_signature(&signature));
            for placement in signature.placements() {
                println!("  {}{} at y={}", placement.letter, placement.glyph, placement.y);
            }
        }
        Command::Play { symbol, arpeggio } => {
            let chord = chord_or_default(symbol.as_deref(), &settings);
            let audio = settings.audio.clone();
            let plan = if arpeggio {
                arpeggio_plan(&chord.midi_notes, audio.arpeggio_delay, &audio)
            } else {
                chord_plan(&chord.midi_notes, audio.chord_duration, &audio)
            };
            let last_start = plan.iter().map(|note| note.offset_secs).fold(0.0, f64::max);
            log::info!("playing {} ({:.1}s)", chord.notation, plan_length_secs(&plan));

            let player = Player::new(LogOutput, audio);
            player.dispatch(plan);
            // Let the detached scheduler reach its last note before exiting
            thread::sleep(Duration::from_secs_f64(last_start + 0.05));
        }
        Command::Export {
            symbol,
            output,
            format,
            arpeggio,
        } => {
            let chord = chord_from_symbol(&symbol);
            let result = match format {
                ExportFormat::Midi => {
                    let audio = &settings.audio;
                    let plan = if arpeggio {
                        arpeggio_plan(&chord.midi_notes, audio.arpeggio_delay, audio)
                    } else {
                        chord_plan(&chord.midi_notes, audio.chord_duration, audio)
                    };
                    harmonia::midi::write_midi(&plan, &chord.notation, &output)
                }
                ExportFormat::Musicxml => fs::write(&output, chord_to_musicxml(&chord))
                    .map_err(harmonia::HarmoniaError::from),
            };
            if let Err(e) = result {
                eprintln!("Error writing to '{}': {}", output.display(), e);
                process::exit(1);
            }
            eprintln!("Wrote {} to {}", chord.notation, output.display());
        }
    }
}

fn chord_from_symbol(symbol: &str) -> ChordDefinition {
    resolve_symbol(symbol).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    })
}

fn chord_or_default(symbol: Option<&str>, settings: &Settings) -> ChordDefinition {
    match symbol {
        Some(symbol) => chord_from_symbol(symbol),
        None => resolve(settings.root, settings.quality).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
    }
}

fn describe_signature(signature: &KeySignature) -> String {
    match signature.count {
        0 => "no accidentals".to_string(),
        n => format!("{} {}", n, signature.kind.glyph()),
    }
}

fn print_chord(chord: &ChordDefinition) {
    let names: Vec<&str> = chord.notes.iter().map(|n| n.as_str()).collect();
    let intervals: Vec<String> = chord.intervals().iter().map(|i| i.to_string()).collect();

    println!("{}  ({} {})", chord.notation, chord.root, chord.quality);
    println!("  notes:     {}", names.join(" - "));
    println!("  midi:      {:?}", chord.midi_notes);
    println!("  intervals: {}", intervals.join(" - "));
    println!(
        "  key:       {}",
        describe_signature(&signature_for(Key::major(chord.root)))
    );

    println!("  staff:");
    for note in layout_chord(chord) {
        let ledger = if note.ledger_y.is_some() { " (ledger)" } else { "" };
        println!("    {:<3} y={}{}", note.name.as_str(), note.y, ledger);
    }

    let keys: String = keyboard(chord)
        .iter()
        .map(|key| match (key.highlighted, key.black) {
            (true, _) => '*',
            (false, true) => '#',
            (false, false) => '.',
        })
        .collect();
    println!("  keyboard:  {}", keys);
}

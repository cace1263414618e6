//! Runs one pad over a recorded trace and prints every detected hit as JSON.
//!
//! Without arguments a few strikes are synthesized instead:
//!
//! ```text
//! cargo run --example replay -- [TRACE_FILE [CONFIG_FILE]]
//! ```
use anyhow::{Context, Result};
use drum_trigger::config::Config;
use drum_trigger::detector::Hit;
use drum_trigger::trace::{Sample, Trace};
use drum_trigger::{Observer, Pad};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::str::FromStr;
use uom::si::f64::{Frequency, Time};
use uom::si::frequency::{hertz, kilohertz};
use uom::si::time::{millisecond, second};

#[derive(Default)]
struct JsonPrinter {
    samples: u64,
    windows: u64,
    hits: u64,
}

impl Observer for JsonPrinter {
    fn on_sample(&mut self, _: &Sample) {
        self.samples += 1;
    }

    fn on_window_open(&mut self, _: &Sample) {
        self.windows += 1;
    }

    fn on_hit(&mut self, hit: &Hit) {
        self.hits += 1;
        let json = serde_json::json!({
            "kind": hit.kind.as_str(),
            "peak_head": hit.peak_head,
            "peak_rim": hit.peak_rim,
            "t_ms": hit.t_ms,
        });
        println!("{json}");
    }
}

struct Strike {
    at: Time,
    head: f64,
    rim: f64,
}

// Piezo output after the envelope follower: an instant attack and an
// exponential decay, plus gaussian noise.
fn synthesize(rate: Frequency, duration: Time, strikes: &[Strike]) -> Result<Trace> {
    let decay = Time::new::<millisecond>(1.5).get::<second>();
    let noise = Normal::new(0.0, 8.0).context("failed to create noise distribution")?;
    let mut rng = StdRng::seed_from_u64(7);

    let count = (duration.get::<second>() * rate.get::<hertz>()) as u64;
    let trace = (0..count)
        .map(|n| {
            let t = n as f64 / rate.get::<hertz>();
            let (mut head, mut rim) = (0.0, 0.0);
            for strike in strikes {
                let dt = t - strike.at.get::<second>();
                if dt >= 0.0 {
                    head += strike.head * (-dt / decay).exp();
                    rim += strike.rim * (-dt / decay).exp();
                }
            }
            let mut adc = |v: f64| (v + noise.sample(&mut rng)).clamp(0.0, 4095.0) as u16;

            Sample {
                t_ms: Time::new::<second>(t).get::<millisecond>() as u32,
                head: adc(head),
                rim: adc(rim),
            }
        })
        .collect();

    Ok(trace)
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let trace = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read trace `{path}`"))?;
            Trace::from_str(&text).with_context(|| format!("failed to parse trace `{path}`"))?
        }
        None => {
            let ms = Time::new::<millisecond>;
            let strikes = [
                Strike {
                    at: ms(50.0),
                    head: 900.0,
                    rim: 40.0,
                },
                Strike {
                    at: ms(120.0),
                    head: 60.0,
                    rim: 1100.0,
                },
                Strike {
                    at: ms(200.0),
                    head: 1400.0,
                    rim: 1250.0,
                },
                Strike {
                    at: ms(280.0),
                    head: 2000.0,
                    rim: 220.0,
                },
                // Bounce inside the retrigger lock of the previous strike.
                Strike {
                    at: ms(290.0),
                    head: 700.0,
                    rim: 0.0,
                },
            ];
            synthesize(
                Frequency::new::<kilohertz>(5.0),
                Time::new::<millisecond>(400.0),
                &strikes,
            )?
        }
    };
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config `{path}`"))?;
            Config::from_str(&text).with_context(|| format!("failed to parse config `{path}`"))?
        }
        None => Config::default(),
    };

    let printer = Pad::builder()
        .config(config)
        .observer(JsonPrinter::default())
        .build()
        .run(trace);

    eprintln!(
        "{} samples, {} windows, {} hits",
        printer.samples, printer.windows, printer.hits
    );

    Ok(())
}

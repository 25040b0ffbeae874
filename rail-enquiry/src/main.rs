use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rail_enquiry::captcha::{OarTextRecognizer, RetryPolicy, TesseractCli, TextRecognizer};
use rail_enquiry::domain::{
    Pnr, Quota, StationCode, TrainNumber, TravelClass, parse_journey_date, quota_choices,
};
use rail_enquiry::enquiry::{
    DEFAULT_BASE_URL, DEFAULT_LIVE_BASE_URL, EnquiryClient, EnquiryConfig, JourneyQuery,
    QueryDefaults,
};
use rail_enquiry::reference::{self, ReferenceClient};

#[derive(Parser)]
#[command(name = "rail-enquiry")]
#[command(about = "Query the Indian Railways enquiry site")]
struct Args {
    /// Directory holding the station and train reference lists
    #[arg(long, env = "RAIL_ENQUIRY_CACHE_DIR", default_value = ".")]
    cache_dir: PathBuf,

    #[arg(long, env = "RAIL_ENQUIRY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "RAIL_ENQUIRY_LIVE_BASE_URL", default_value = DEFAULT_LIVE_BASE_URL)]
    live_base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Captcha attempts before giving up
    #[arg(long, default_value_t = 5)]
    captcha_attempts: u32,

    /// OCR backend used to read captchas
    #[arg(long, value_enum, default_value_t = OcrBackend::Oar)]
    ocr: OcrBackend,

    /// ONNX text recognition model
    #[arg(
        long,
        env = "RAIL_ENQUIRY_REC_MODEL",
        default_value = "models/PP-OCRv5_mobile_rec.onnx"
    )]
    rec_model: PathBuf,

    /// Character dictionary for the recognition model
    #[arg(
        long,
        env = "RAIL_ENQUIRY_CHAR_DICT",
        default_value = "models/ppocrv5_dict.txt"
    )]
    char_dict: PathBuf,

    /// Path to the tesseract executable, used with `--ocr tesseract`
    #[arg(long, env = "TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Source station used when a command leaves it out
    #[arg(long, env = "RAIL_ENQUIRY_FROM")]
    default_from: Option<String>,

    /// Destination station used when a command leaves it out
    #[arg(long, env = "RAIL_ENQUIRY_TO")]
    default_to: Option<String>,

    /// Journey date used when a command leaves it out
    #[arg(long, env = "RAIL_ENQUIRY_DATE", value_parser = parse_journey_date)]
    default_date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum OcrBackend {
    /// CRNN recognition model run through oar-ocr
    Oar,
    /// The tesseract command-line tool
    Tesseract,
}

#[derive(clap::Args)]
struct Journey {
    /// Source station code or name
    #[arg(long)]
    from: Option<String>,

    /// Destination station code or name
    #[arg(long)]
    to: Option<String>,

    /// Journey date, dd-mm-yyyy or yyyy-mm-dd
    #[arg(long, value_parser = parse_journey_date)]
    date: Option<NaiveDate>,
}

impl Journey {
    fn query(&self) -> JourneyQuery {
        JourneyQuery {
            source: self.from.clone(),
            destination: self.to.clone(),
            date: self.date,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Trains between two stations
    Trains {
        #[command(flatten)]
        journey: Journey,
    },
    /// Seat availability in a train
    Seats {
        #[arg(value_parser = TrainNumber::parse)]
        train: TrainNumber,
        #[arg(long, default_value_t = TravelClass::sleeper())]
        class: TravelClass,
        #[arg(long, default_value_t = Quota::General)]
        quota: Quota,
        #[command(flatten)]
        journey: Journey,
    },
    /// Fare breakdown for a train and class
    Fare {
        #[arg(value_parser = TrainNumber::parse)]
        train: TrainNumber,
        #[arg(long, default_value_t = TravelClass::sleeper())]
        class: TravelClass,
        #[arg(long, default_value_t = Quota::General)]
        quota: Quota,
        #[command(flatten)]
        journey: Journey,
    },
    /// Stations a train calls at
    Schedule {
        #[arg(value_parser = TrainNumber::parse)]
        train: TrainNumber,
        #[command(flatten)]
        journey: Journey,
    },
    /// PNR status
    Pnr {
        #[arg(value_parser = Pnr::parse)]
        pnr: Pnr,
    },
    /// Live running status
    Status {
        #[arg(value_parser = TrainNumber::parse)]
        train: TrainNumber,
    },
    /// Trains and classes with seats available, with fares
    Available {
        #[command(flatten)]
        journey: Journey,
    },
    /// Stations matching a name or code
    SearchStation { query: String },
    /// Trains matching a number or name
    SearchTrain { query: String },
    /// Quota codes accepted by seat and fare enquiries
    Quotas,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = EnquiryConfig::new()
        .with_base_url(&args.base_url)
        .with_live_base_url(&args.live_base_url)
        .with_cache_dir(&args.cache_dir)
        .with_timeout(args.timeout)
        .with_retry_policy(RetryPolicy {
            max_attempts: args.captcha_attempts,
            ..RetryPolicy::default()
        })
        .with_defaults(QueryDefaults {
            source: args.default_from.clone(),
            destination: args.default_to.clone(),
            date: args.default_date,
        });

    match &args.command {
        Command::Quotas => {
            for (code, description) in quota_choices() {
                println!("{code:<5} {description}");
            }
            return Ok(());
        }
        Command::SearchStation { query } => {
            let references = reference_client(&config)?;
            let stations =
                reference::load_or_fetch::<StationCode>(&references, &config.cache_dir).await?;
            for m in stations.search(query, 5) {
                println!("{:>3}  {}", m.score, m.entry);
            }
            return Ok(());
        }
        Command::SearchTrain { query } => {
            let references = reference_client(&config)?;
            let trains =
                reference::load_or_fetch::<TrainNumber>(&references, &config.cache_dir).await?;
            for m in trains.search(query, 5) {
                println!("{:>3}  {}", m.score, m.entry);
            }
            return Ok(());
        }
        _ => {}
    }

    let recognizer: Arc<dyn TextRecognizer> = match args.ocr {
        OcrBackend::Oar => Arc::new(
            OarTextRecognizer::new(&args.rec_model, &args.char_dict)
                .context("failed to load the captcha recognizer")?,
        ),
        OcrBackend::Tesseract => Arc::new(TesseractCli::new().with_program(&args.tesseract)),
    };
    let client = EnquiryClient::connect(config, recognizer)
        .await
        .context("failed to start an enquiry session")?;

    match args.command {
        Command::Trains { journey } => {
            let records = client.trains_between(&journey.query()).await?;
            print!("{}", records.table());
        }
        Command::Seats {
            train,
            class,
            quota,
            journey,
        } => {
            let records = client
                .seat_availability(&train, &class, quota, &journey.query())
                .await?;
            print!("{}", records.table());
        }
        Command::Fare {
            train,
            class,
            quota,
            journey,
        } => {
            let fare = client.fare(&train, &class, quota, &journey.query()).await?;
            print!("{}", fare.table());
        }
        Command::Schedule { train, journey } => {
            let records = client.train_schedule(&train, &journey.query()).await?;
            print!("{}", records.table());
        }
        Command::Pnr { pnr } => {
            let status = client.pnr_status(&pnr).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Status { train } => {
            let status = client.train_status(&train).await?;
            for (name, value) in status.fields() {
                println!("{name}: {value}");
            }
            println!();
            print!("{}", status.rakes_table());
            for table in status.station_tables() {
                println!();
                print!("{table}");
            }
        }
        Command::Available { journey } => {
            for option in client.find_available(&journey.query()).await? {
                let train = &option.train;
                println!(
                    "{} {} {} - {}",
                    train.train_number,
                    train.train_name.as_deref().unwrap_or_default(),
                    train.departure_time.as_deref().unwrap_or_default(),
                    train.arrival_time.as_deref().unwrap_or_default(),
                );
                match option.total_fare {
                    Some(fare) => println!("  {} fare {fare}", option.class),
                    None => println!("  {}", option.class),
                }
                for day in &option.days {
                    println!(
                        "    {} {}",
                        day.date.as_deref().unwrap_or_default(),
                        day.status.as_deref().unwrap_or_default()
                    );
                }
            }
        }
        Command::Quotas | Command::SearchStation { .. } | Command::SearchTrain { .. } => {}
    }

    Ok(())
}

fn reference_client(config: &EnquiryConfig) -> anyhow::Result<ReferenceClient> {
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(ReferenceClient::new(http, config.base_url.clone()))
}

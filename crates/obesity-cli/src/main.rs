use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use obesity_classifiers::config::TrainConfig;
use obesity_cli::predict;
use obesity_cli::train;
use obesity_cli::train::input as train_input;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("OBESITY_LOG", "error,obesity=info"))
        .init();

    let matches = Command::new("obesity")
        .version(clap::crate_version!())
        .about("Obesity level classification from patient survey data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train the baseline and tuned models and keep the better one")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file (JSON). Defaults are used when omitted.")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to training data. Overrides the training data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "File path that the trained model artifact will be written to. \
                             Overrides the path specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("metrics_file")
                        .long("metrics")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("File path that the metrics JSON will be written to.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("random_state")
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for the split and the forest."),
                )
                .arg(
                    Arg::new("n_estimators")
                        .long("n-estimators")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of trees per forest."),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict obesity levels with a trained model")
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model artifact (*.json)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("record")
                        .short('r')
                        .long("record")
                        .help("Path to a single patient record (JSON object)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .conflicts_with("inference_data")
                        .required_unless_present("inference_data")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("inference_data")
                        .short('d')
                        .long("inference_data")
                        .help("Path to a CSV/TSV file of records to predict")
                        .value_parser(clap::value_parser!(PathBuf))
                        .requires("output_file")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help("Path to the output file for batch predictions (*.tsv or *.csv)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("config").about("Print the default training configuration"))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("config", _)) => {
            println!("{}", serde_json::to_string_pretty(&TrainConfig::default())?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if let Some(path) = config_path {
        log::info!("[Obesity::Train] Training from config: {:?}", path);
    }

    let params = train_input::from_arguments(config_path, matches)?;

    match train::run(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let model_path: &PathBuf = matches
        .get_one("model_path")
        .ok_or_else(|| anyhow::anyhow!("--model is required"))?;

    let result = predict::load_pipeline(model_path).and_then(|pipeline| {
        if let Some(record) = matches.get_one::<PathBuf>("record") {
            let value = predict::predict_record(pipeline, record)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        } else {
            let data: &PathBuf = matches
                .get_one("inference_data")
                .ok_or_else(|| anyhow::anyhow!("--record or --inference_data is required"))?;
            let output: &PathBuf = matches
                .get_one("output_file")
                .ok_or_else(|| anyhow::anyhow!("--output_file is required with --inference_data"))?;
            let n = predict::predict_file(pipeline, data, output)?;
            eprintln!("[Obesity::Predict] Wrote {} predictions to {:?}", n, output);
            Ok(())
        }
    });

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

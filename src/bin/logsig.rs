use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use logsig_engine::{
    logsignature_channels, lyndon_brackets, lyndon_words, make_transform, Device, LogSignatureMode,
    TensorAlgebraLayout, Tensor,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::process;

/// `convert` 입력 파일 형식
#[derive(Debug, Deserialize)]
struct SignatureFile {
    channels: usize,
    depth: usize,
    shape: Vec<usize>,
    data: Vec<f64>,
}

/// `convert` 출력 형식
#[derive(Debug, Serialize, Deserialize)]
struct LogsignatureFile {
    channels: usize,
    depth: usize,
    mode: LogSignatureMode,
    shape: Vec<usize>,
    data: Vec<f64>,
}

fn cli() -> Command {
    Command::new("logsig")
        .version("0.1.0")
        .about("절단 시그니처 → 로그시그니처 변환 도구")
        .subcommand(
            Command::new("basis")
                .about("로그시그니처 기저 출력")
                .arg(
                    Arg::new("channels")
                        .long("channels")
                        .short('c')
                        .required(true)
                        .value_parser(value_parser!(usize))
                        .help("경로 채널 수"),
                )
                .arg(
                    Arg::new("depth")
                        .long("depth")
                        .short('d')
                        .required(true)
                        .value_parser(value_parser!(usize))
                        .help("절단 깊이"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .default_value("words")
                        .help("expand | brackets | words"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("JSON 시그니처를 로그시그니처로 변환")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .required(true)
                        .value_name("FILE")
                        .help("{channels, depth, shape, data} 형식 JSON"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("출력 파일 (생략하면 표준 출력)"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .default_value("words")
                        .help("expand | brackets | words"),
                )
                .arg(
                    Arg::new("stream")
                        .long("stream")
                        .action(ArgAction::SetTrue)
                        .help("(batch, stream, channels) 입력"),
                ),
        )
}

fn main() {
    env_logger::init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("basis", sub_matches)) => handle_basis(sub_matches).map(|text| print!("{}", text)),
        Some(("convert", sub_matches)) => handle_convert(sub_matches),
        _ => {
            eprintln!("사용법: logsig <basis|convert> --help");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ 오류: {:#}", e);
        process::exit(1);
    }
}

fn required<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, name: &str) -> Result<&'a T> {
    matches
        .get_one::<T>(name)
        .ok_or_else(|| anyhow!("missing --{}", name))
}

fn parse_mode(matches: &ArgMatches) -> Result<LogSignatureMode> {
    Ok(required::<String>(matches, "mode")?.parse()?)
}

fn handle_basis(matches: &ArgMatches) -> Result<String> {
    let channels = *required::<usize>(matches, "channels")?;
    let depth = *required::<usize>(matches, "depth")?;
    let mode = parse_mode(matches)?;
    render_basis(channels, depth, mode)
}

/// 한 줄에 기저 원소 하나
fn render_basis(channels: usize, depth: usize, mode: LogSignatureMode) -> Result<String> {
    let layout = TensorAlgebraLayout::new(channels, depth)?;
    let mut text = format!(
        "# channels={} depth={} mode={} signature_channels={} logsignature_channels={}\n",
        channels,
        depth,
        mode,
        layout.signature_channels(),
        logsignature_channels(channels, depth, mode)?
    );

    match mode {
        LogSignatureMode::Words => {
            for (index, word) in lyndon_words(channels, depth)?.iter().enumerate() {
                text.push_str(&format!("{}\t{}\n", index, word));
            }
        }
        LogSignatureMode::Brackets => {
            for (index, bracket) in lyndon_brackets(channels, depth)?.iter().enumerate() {
                text.push_str(&format!("{}\t{}\n", index, bracket));
            }
        }
        LogSignatureMode::Expand => {
            let mut index = 0;
            for level in 1..=depth {
                for flat in 0..layout.level_size(level) {
                    let letters: Vec<String> = (0..level)
                        .rev()
                        .map(|j| ((flat / channels.pow(j as u32)) % channels).to_string())
                        .collect();
                    text.push_str(&format!("{}\t{}\n", index, letters.join(",")));
                    index += 1;
                }
            }
        }
    }
    Ok(text)
}

fn handle_convert(matches: &ArgMatches) -> Result<()> {
    let input = PathBuf::from(required::<String>(matches, "input")?);
    let mode = parse_mode(matches)?;
    let stream = matches.get_flag("stream");

    let raw = fs::read_to_string(&input).with_context(|| format!("cannot read {}", input.display()))?;
    let converted = convert(&raw, mode, stream)?;
    let json = serde_json::to_string_pretty(&converted)?;

    match matches.get_one::<String>("output") {
        Some(path) => fs::write(path, json).with_context(|| format!("cannot write {}", path))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn convert(raw: &str, mode: LogSignatureMode, stream: bool) -> Result<LogsignatureFile> {
    let file: SignatureFile = serde_json::from_str(raw).context("invalid signature JSON")?;
    let signature = Tensor::from_shape_vec(&file.shape, file.data, Device::Cpu)?;

    let transform = make_transform(file.channels, file.depth, stream, mode)?;
    let logsig = transform.forward(&signature)?;
    log::info!(
        "converted signature {:?} → logsignature {:?} ({})",
        signature.shape(),
        logsig.shape(),
        mode
    );

    Ok(LogsignatureFile {
        channels: file.channels,
        depth: file.depth,
        mode,
        shape: logsig.shape().to_vec(),
        data: logsig.to_vec(),
    })
}

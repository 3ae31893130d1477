// main.rs      gifscribe command
//
// Copyright (c) 2026  gifscribe developers
//
#![forbid(unsafe_code)]

use clap::{App, Arg, ArgMatches};
use gifscribe::block::DisposalMethod;
use gifscribe::glyph::{FontSpec, DEFAULT_FAMILY};
use gifscribe::Converter;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &'static str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    let matches = create_app().get_matches();
    if let Err(e) = convert(&mut out, &matches) {
        let mut red = ColorSpec::new();
        red.set_fg(Some(Color::Red)).set_intense(true);
        out.set_color(&red)?;
        writeln!(out, "error: {}", e)?;
        out.reset()?;
        std::process::exit(1);
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifscribe")
        .version(VERSION)
        .about("Render text as an animated GIF, one glyph per frame")
        .arg(
            Arg::with_name("input")
                .required_unless("text")
                .help("text file to convert (\"-\" for stdin)"),
        )
        .arg(
            Arg::with_name("output")
                .required_unless("text")
                .help("GIF file to write"),
        )
        .arg(
            Arg::with_name("text")
                .short("t")
                .long("text")
                .takes_value(true)
                .value_name("TEXT")
                .help("convert this text (the only file is <output>)"),
        )
        .arg(
            Arg::with_name("delay")
                .short("d")
                .long("delay")
                .takes_value(true)
                .value_name("CS")
                .default_value("100")
                .help("frame delay in hundredths of a second"),
        )
        .arg(
            Arg::with_name("loop")
                .short("l")
                .long("loop")
                .help("loop the animation forever"),
        )
        .arg(
            Arg::with_name("repeat")
                .short("r")
                .long("repeat")
                .takes_value(true)
                .value_name("N")
                .help("loop the animation N times (overrides --loop)"),
        )
        .arg(
            Arg::with_name("font")
                .short("f")
                .long("font")
                .takes_value(true)
                .value_name("FAMILY")
                .default_value(DEFAULT_FAMILY)
                .help("font family"),
        )
        .arg(
            Arg::with_name("size")
                .short("s")
                .long("size")
                .takes_value(true)
                .value_name("PT")
                .default_value("48")
                .help("point size"),
        )
        .arg(
            Arg::with_name("background")
                .short("b")
                .long("background")
                .help("dispose frames to background"),
        )
}

/// Make a converter from command-line options
fn converter(matches: &ArgMatches) -> Result<Converter, Box<dyn Error>> {
    let delay = matches.value_of("delay").unwrap_or("100").parse()?;
    let size = matches.value_of("size").unwrap_or("48").parse()?;
    let family = matches.value_of("font").unwrap_or(DEFAULT_FAMILY);
    let loop_count = match matches.value_of("repeat") {
        Some(n) => Some(n.parse()?),
        None if matches.is_present("loop") => Some(0),
        None => None,
    };
    let disposal_method = if matches.is_present("background") {
        DisposalMethod::Background
    } else {
        DisposalMethod::Keep
    };
    Ok(Converter::default()
        .with_font(
            FontSpec::default()
                .with_family(family)
                .with_point_size(size),
        )
        .with_delay_time_cs(delay)
        .with_loop_count(loop_count)
        .with_disposal_method(disposal_method))
}

/// Convert input text to a GIF file
fn convert(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let conv = converter(matches)?;
    let text = matches.value_of("text");
    let input = matches.value_of_os("input");
    // with --text, a lone file argument is the output
    let output = match (text, matches.value_of_os("output")) {
        (_, Some(output)) => output,
        (Some(_), None) => input.ok_or("no output file")?,
        (None, None) => return Err("no output file".into()),
    };
    let mut sink = BufWriter::new(File::create(output)?);
    let n_frames = match (text, input) {
        (Some(text), _) => conv.convert_str(text, &mut sink)?,
        (None, Some(path)) if path == "-" => {
            conv.convert(io::stdin().lock(), &mut sink)?
        }
        (None, Some(path)) => {
            conv.convert(BufReader::new(File::open(path)?), &mut sink)?
        }
        (None, None) => return Err("no input file".into()),
    };
    sink.flush()?;
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    out.set_color(&bold)?;
    write!(out, "{} frames", n_frames)?;
    out.set_color(&magenta)?;
    writeln!(out, " {:?}", output)?;
    Ok(())
}

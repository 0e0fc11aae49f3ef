use std::{env, fs, process};

use anyhow::Context;
use jpeg_segments::{Error, JpegParser, ParseOptions, RestartMarkers, Segment, SegmentKind};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("jpeg_segments", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let (mut strict, mut stop_at_restart, mut path) = (false, false, None);
    for arg in env::args().skip(1) {
        match &*arg {
            "--strict" => strict = true,
            "--stop-at-restart" => stop_at_restart = true,
            _ if path.is_none() && !arg.starts_with("--") => path = Some(arg),
            _ => usage(),
        }
    }
    let Some(path) = path else { usage() };

    let mut options = if strict {
        ParseOptions::strict()
    } else {
        ParseOptions::new()
    };
    if stop_at_restart {
        options = options.restart_markers(RestartMarkers::Stop);
    }

    let jpeg = fs::read(&path).with_context(|| format!("could not read '{path}'"))?;

    if let Err(e) = dump(&jpeg, options) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    Ok(())
}

fn usage() -> ! {
    eprintln!("usage: dump [--strict] [--stop-at-restart] <file.jpeg>");
    process::exit(1);
}

fn dump(jpeg: &[u8], options: ParseOptions) -> Result<(), Error> {
    let mut parser = JpegParser::with_options(jpeg, options)?;
    while let Some(segment) = parser.next_segment()? {
        print_segment(&segment);
    }

    if !parser.remaining().is_empty() {
        println!("{} trailing bytes after EOI", parser.remaining().len());
    }
    Ok(())
}

fn print_segment(segment: &Segment<'_>) {
    println!(
        "{:#06x} {} (0xFF{:02X}): {} bytes",
        segment.offset(),
        segment.marker(),
        segment.marker().code(),
        segment.raw_bytes().len(),
    );

    let Some(kind) = segment.as_segment_kind() else {
        return;
    };
    match kind {
        SegmentKind::Jfif(jfif) => {
            println!(
                "    version: {}.{:02}",
                jfif.major_version(),
                jfif.minor_version()
            );
            println!("    density unit: {}", jfif.unit());
            println!("    x density: {}", jfif.density_x());
            println!("    y density: {}", jfif.density_y());
            println!(
                "    thumbnail: {}x{}, {} bytes",
                jfif.thumbnail_width(),
                jfif.thumbnail_height(),
                jfif.thumbnail_data().len()
            );
        }
        SegmentKind::Dqt(dqt) => {
            for table in dqt.tables() {
                println!(
                    "    table {}: {}-bit, {} bytes",
                    table.Tq(),
                    if table.is_16_bit() { 16 } else { 8 },
                    table.Qk().len()
                );
            }
        }
        SegmentKind::Sof(sof) => {
            println!("    process: {:?}", sof.sof());
            println!("    precision: {} bits", sof.P());
            println!("    size: {}x{}", sof.width(), sof.height());
            for c in sof.components() {
                println!(
                    "    component {}: sampling {}x{}, quantization table {}",
                    c.id(),
                    c.Hi(),
                    c.Vi(),
                    c.Tqi()
                );
            }
        }
        SegmentKind::Dht(dht) => {
            for table in dht.tables() {
                println!(
                    "    table {} {}: {} symbols",
                    table.class(),
                    table.Th(),
                    table.Vij().len()
                );
            }
        }
        SegmentKind::Sos(sos) => {
            for c in sos.components() {
                println!(
                    "    component {}: DC table {}, AC table {}",
                    c.id(),
                    c.Tdj(),
                    c.Taj()
                );
            }
            if let (Some(ss), Some(se), Some(ah), Some(al)) = (sos.Ss(), sos.Se(), sos.Ah(), sos.Al())
            {
                println!("    spectral selection {ss}..={se}, approximation {ah}/{al}");
            }
            println!(
                "    scan data at {:#06x}: {} bytes, {} restart interval(s)",
                sos.data().offset(),
                sos.data().data().len(),
                sos.data().intervals().len()
            );
        }
        SegmentKind::Dri(dri) => println!("    restart interval: {} MCUs", dri.Ri()),
        SegmentKind::Dnl(dnl) => println!("    number of lines: {}", dnl.NL()),
        SegmentKind::Com(com) => println!("    \"{}\"", com.text().escape_ascii()),
        _ => {}
    }
}

//! Thin command-line front end: load a file, run the analysis, print the
//! report. All the interesting work happens in the library.

use anyhow::{bail, Context, Result};
use std::env;

use ancalagon::io::{ImageBuffer, IoLimits};
use ancalagon::report::{ImportSymbol, LayoutReport, TableStatus};
use ancalagon::{logging, pe};

fn main() -> Result<()> {
    let mut json = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else if path.is_none() {
            path = Some(arg);
        } else {
            bail!("unexpected argument: {arg}");
        }
    }
    let Some(path) = path else {
        bail!("usage: ancalagon [--json] <image-path>");
    };

    if json {
        logging::init_tracing_json();
    } else {
        logging::init_tracing();
    }

    let buffer = ImageBuffer::open(&path, &IoLimits::default())
        .with_context(|| format!("failed to load {path}"))?;
    let report = pe::inspect(buffer.as_slice())
        .with_context(|| format!("failed to analyze {path}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &LayoutReport) {
    println!("Image type:\t{}", report.bitness.label());

    println!("Sections:");
    for section in &report.sections {
        println!(
            "\t{:<8}  rva {:#010x}  size {:#010x}  raw {:#010x}",
            section.name, section.virtual_address, section.virtual_size, section.raw_offset
        );
    }

    println!("Imports:");
    match &report.imports {
        TableStatus::Absent => println!("\t(absent)"),
        status => {
            for (i, dll) in status.entries().iter().enumerate() {
                println!("\t{}:\t{}", i + 1, dll.dll);
                for symbol in &dll.symbols {
                    match symbol {
                        ImportSymbol::Ordinal(n) => println!("\t\t\tordinal {n}"),
                        ImportSymbol::Name(name) => println!("\t\t\t{name}"),
                    }
                }
            }
            if let TableStatus::Truncated(_) = status {
                println!("\t(table truncated)");
            }
        }
    }

    print_name_table("Bound imports:", &report.bound_imports);
    print_name_table("Delay imports:", &report.delay_imports);
}

fn print_name_table(title: &str, status: &TableStatus<String>) {
    println!("{title}");
    match status {
        TableStatus::Absent => println!("\t(absent)"),
        status => {
            for (i, name) in status.entries().iter().enumerate() {
                println!("\t{}:\t{}", i + 1, name);
            }
            if let TableStatus::Truncated(_) = status {
                println!("\t(table truncated)");
            }
        }
    }
}

//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::executor::ScanResponse;
use crate::services::ServiceLabel;
use crate::types::ScanRequest;
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print results in human-readable plain text format.
pub fn print_plain(response: &ScanResponse) -> io::Result<()> {
    write_plain(&mut io::stdout().lock(), response)
}

/// Render the result table, sorted by address then port.
pub fn write_plain<W: Write>(out: &mut W, response: &ScanResponse) -> io::Result<()> {
    let mut results = response.results().to_vec();
    results.sort();

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("hostsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    let hosts = {
        let mut ips: Vec<_> = results.iter().map(|r| r.ip).collect();
        ips.dedup();
        ips.len()
    };
    writeln!(
        out,
        "  {} {} services on {} hosts",
        style("Found:").bold(),
        style(results.len()).green().bold(),
        hosts
    )?;
    writeln!(out)?;

    if results.is_empty() {
        writeln!(out, "  {}", style("No services identified.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<15}  {:>6}  {}",
            style("ADDRESS").bold(),
            style("PORT").bold(),
            style("SERVICE").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for found in &results {
            writeln!(
                out,
                "  {:<15}  {:>6}  {}",
                found.ip.to_string(),
                found.port,
                label_style(found.service).apply_to(found.service)
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

fn label_style(label: ServiceLabel) -> Style {
    match label {
        ServiceLabel::SshServer => Style::new().green().bold(),
        ServiceLabel::WebServer => Style::new().blue().bold(),
        ServiceLabel::FtpServer => Style::new().yellow(),
        ServiceLabel::MailServer => Style::new().magenta(),
        ServiceLabel::Unknown => Style::new().dim(),
    }
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(request: &ScanRequest) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("hostsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Range: {} ({} hosts)",
        style("•").dim(),
        style(request.range()).white().bold(),
        request.range().len()
    );
    println!(
        "{} Ports: {}",
        style("•").dim(),
        style(request.ports().len()).white().bold()
    );
    println!(
        "{} Deadline: {}s",
        style("•").dim(),
        style(request.timeout().as_secs()).yellow()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::HostService;
    use crate::types::Port;
    use std::net::Ipv4Addr;

    fn found(last: u8, port: u16, service: ServiceLabel) -> HostService {
        HostService {
            ip: Ipv4Addr::new(10, 0, 0, last),
            port: Port::new(port).unwrap(),
            service,
        }
    }

    #[test]
    fn test_plain_sorted_by_address_then_port() {
        let response = ScanResponse::success(vec![
            found(9, 80, ServiceLabel::WebServer),
            found(2, 25, ServiceLabel::MailServer),
            found(2, 22, ServiceLabel::SshServer),
        ]);
        let mut buf = Vec::new();
        write_plain(&mut buf, &response).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let ssh = text.find("SSH Server").unwrap();
        let mail = text.find("Mail Server").unwrap();
        let web = text.find("Web Server").unwrap();
        assert!(ssh < mail && mail < web);
        assert!(text.contains("10.0.0.9"));
    }

    #[test]
    fn test_plain_empty() {
        let mut buf = Vec::new();
        write_plain(&mut buf, &ScanResponse::success(Vec::new())).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("No services identified."));
    }
}

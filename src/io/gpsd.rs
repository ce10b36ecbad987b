//! gpsd client for following a GPS receiver.
//!
//! gpsd serves newline-delimited JSON over TCP. After a `?WATCH` request it
//! streams reports of several classes; only `TPV` (time, position,
//! velocity) reports carry what the position loop needs.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::common::constants::*;
use crate::geo::Location;

/// Position and ground speed from one report. Either may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fix {
    pub location: Option<Location>,
    /// Meters per second.
    pub speed: Option<f64>,
}

/// What the reader thread hands to the position loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpsMessage {
    Fix(Fix),
    /// The connection to gpsd failed; fixes resume after it is re-established.
    Lost,
}

#[derive(Deserialize)]
struct Report {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
    speed: Option<f64>,
}

/// Parse one report line. Anything but a usable TPV report yields `None`.
pub fn parse_report(line: &str) -> Option<Fix> {
    let report: Report = serde_json::from_str(line).ok()?;
    if report.class != "TPV" {
        return None;
    }

    // modes 2 and 3 are 2D and 3D fixes
    let location = match (report.mode >= 2, report.lon, report.lat) {
        (true, Some(lon), Some(lat)) => Some(Location::new(lon, lat)).filter(Location::is_valid),
        _ => None,
    };
    let speed = report.speed.filter(|speed| speed.is_finite());

    (location.is_some() || speed.is_some()).then_some(Fix { location, speed })
}

/// One connection to gpsd.
pub struct GpsdClient {
    reader: BufReader<TcpStream>,
    // partial line kept across read timeouts
    line: String,
}

impl GpsdClient {
    /// Connect to `address` (`host:port`) and start watching.
    pub fn connect(address: &str) -> Result<Self> {
        let mut stream = TcpStream::connect(address)
            .with_context(|| format!("Failed to connect to gpsd at {address}"))?;

        stream
            .set_read_timeout(Some(Duration::from_secs(GPSD_READ_TIMEOUT_SECS)))
            .context("Failed to set read timeout on gpsd socket")?;
        stream
            .write_all(GPSD_WATCH_REQUEST.as_bytes())
            .context("Failed to send watch request to gpsd")?;

        Ok(Self {
            reader: BufReader::new(stream),
            line: String::new(),
        })
    }

    /// Read the next report.
    ///
    /// `Ok(None)` means the report was not a usable fix, or nothing arrived
    /// before the read timeout.
    pub fn next_fix(&mut self) -> Result<Option<Fix>> {
        match self.reader.read_line(&mut self.line) {
            Ok(0) => bail!("gpsd closed the connection"),
            Ok(_) if self.line.ends_with('\n') => {
                let fix = parse_report(self.line.trim());
                self.line.clear();
                Ok(fix)
            }
            Ok(_) => bail!("gpsd closed the connection mid-report"),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e).context("Failed to read from gpsd"),
        }
    }
}

/// Follow gpsd on a background thread until `running` turns false.
///
/// A failed connection is reported once as [`GpsMessage::Lost`] and retried
/// every few seconds. The thread also ends when the receiver is dropped.
pub fn spawn_reader(address: String, running: Arc<AtomicBool>) -> Result<Receiver<GpsMessage>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name(GPSD_THREAD_NAME.into())
        .spawn(move || follow(&address, &running, &sender))
        .context("Failed to start gpsd reader thread")?;
    Ok(receiver)
}

fn follow(address: &str, running: &AtomicBool, sender: &Sender<GpsMessage>) {
    let mut lost = false;

    while running.load(Ordering::SeqCst) {
        let mut client = match GpsdClient::connect(address) {
            Ok(client) => client,
            Err(e) => {
                if !lost {
                    log_warning!("{e:#}");
                    log_indented!("Retrying every {GPSD_RECONNECT_DELAY_SECS}s");
                    if sender.send(GpsMessage::Lost).is_err() {
                        return;
                    }
                    lost = true;
                }
                thread::sleep(Duration::from_secs(GPSD_RECONNECT_DELAY_SECS));
                continue;
            }
        };

        if lost {
            log_info!("Reconnected to gpsd at {address}");
            lost = false;
        }

        while running.load(Ordering::SeqCst) {
            match client.next_fix() {
                Ok(Some(fix)) => {
                    if sender.send(GpsMessage::Fix(fix)).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log_warning!("{e:#}");
                    if sender.send(GpsMessage::Lost).is_err() {
                        return;
                    }
                    lost = true;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::logger::Log;
    use std::net::TcpListener;

    const TPV: &str = r#"{"class":"TPV","device":"/dev/ttyACM0","mode":3,"time":"2024-04-08T18:10:00.000Z","lat":37.7,"lon":-89.2,"alt":120.0,"speed":1.5,"track":90.0}"#;

    #[test]
    fn test_parse_tpv() {
        assert_eq!(
            parse_report(TPV),
            Some(Fix {
                location: Some(Location::new(-89.2, 37.7)),
                speed: Some(1.5),
            })
        );
    }

    #[test]
    fn test_parse_ignores_other_reports() {
        assert_eq!(parse_report(r#"{"class":"VERSION","release":"3.25"}"#), None);
        assert_eq!(parse_report(r#"{"class":"SKY","satellites":[]}"#), None);
        assert_eq!(parse_report("not json"), None);
        assert_eq!(parse_report(""), None);
    }

    #[test]
    fn test_parse_without_position_fix() {
        // mode 1 is "no fix"; the speed is still worth keeping
        assert_eq!(
            parse_report(r#"{"class":"TPV","mode":1,"lat":1.0,"lon":2.0,"speed":0.2}"#),
            Some(Fix {
                location: None,
                speed: Some(0.2),
            })
        );
        assert_eq!(parse_report(r#"{"class":"TPV","mode":1}"#), None);
        assert_eq!(
            parse_report(r#"{"class":"TPV","mode":2,"lat":1.0,"lon":2.0}"#),
            Some(Fix {
                location: Some(Location::new(2.0, 1.0)),
                speed: None,
            })
        );
    }

    // Serves the given lines to one client after reading its watch request
    fn serve(lines: Vec<String>) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();
            let mut stream = stream;
            for line in lines {
                stream.write_all(line.as_bytes()).unwrap();
                stream.write_all(b"\n").unwrap();
            }
            request
        });
        (address, handle)
    }

    #[test]
    fn test_client_reads_fixes() {
        let (address, server) = serve(vec![
            r#"{"class":"VERSION","release":"3.25"}"#.to_string(),
            TPV.to_string(),
        ]);
        let mut client = GpsdClient::connect(&address).unwrap();

        assert_eq!(client.next_fix().unwrap(), None);
        let fix = client.next_fix().unwrap().unwrap();
        assert_eq!(fix.location, Some(Location::new(-89.2, 37.7)));

        assert_eq!(server.join().unwrap(), GPSD_WATCH_REQUEST);
        assert!(client.next_fix().is_err());
    }

    #[test]
    fn test_client_connect_failure() {
        // bind then drop to get a port nobody listens on
        let address = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .to_string();
        let err = GpsdClient::connect(&address).err().unwrap();
        assert!(err.to_string().contains("Failed to connect to gpsd"));
    }

    #[test]
    fn test_reader_forwards_fixes_then_loss() {
        Log::set_enabled(false);
        let (address, server) = serve(vec![TPV.to_string()]);
        let running = Arc::new(AtomicBool::new(true));
        let messages = spawn_reader(address, Arc::clone(&running)).unwrap();

        let first = messages.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(first, GpsMessage::Fix(Fix { location: Some(_), .. })));

        server.join().unwrap();
        let second = messages.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(second, GpsMessage::Lost);

        running.store(false, Ordering::SeqCst);
    }
}

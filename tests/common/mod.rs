//! Fixture builders for integration tests
//!
//! FIT fixtures are encoded here rather than checked in: a minimal FIT file
//! is one definition message per local type plus `record` data messages.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z)
const FIT_EPOCH_OFFSET: i64 = 631_065_600;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

fn fit_crc(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in bytes {
        let mut tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];

        tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize];
    }
    crc
}

fn degrees_to_semicircles(degrees: f64) -> i32 {
    (degrees * (2_147_483_648.0 / 180.0)).round() as i32
}

/// One FIT `record` message: Unix timestamp and optional (lat, lon)
#[derive(Debug, Clone, Copy)]
pub struct FitSample {
    pub unix_seconds: i64,
    pub position: Option<(f64, f64)>,
}

/// Encode samples as a FIT activity file
pub fn fit_bytes(samples: &[FitSample]) -> Vec<u8> {
    const RECORD_MESG: u16 = 20;
    let mut data = Vec::new();

    // Local type 0: timestamp, position_lat, position_long
    data.extend_from_slice(&[0x40, 0x00, 0x00]);
    data.extend_from_slice(&RECORD_MESG.to_le_bytes());
    data.extend_from_slice(&[3, 253, 4, 0x86, 0, 4, 0x85, 1, 4, 0x85]);

    // Local type 1: timestamp only
    data.extend_from_slice(&[0x41, 0x00, 0x00]);
    data.extend_from_slice(&RECORD_MESG.to_le_bytes());
    data.extend_from_slice(&[1, 253, 4, 0x86]);

    for sample in samples {
        let fit_time = (sample.unix_seconds - FIT_EPOCH_OFFSET) as u32;
        match sample.position {
            Some((lat, lon)) => {
                data.push(0x00);
                data.extend_from_slice(&fit_time.to_le_bytes());
                data.extend_from_slice(&degrees_to_semicircles(lat).to_le_bytes());
                data.extend_from_slice(&degrees_to_semicircles(lon).to_le_bytes());
            }
            None => {
                data.push(0x01);
                data.extend_from_slice(&fit_time.to_le_bytes());
            }
        }
    }

    let mut file = Vec::with_capacity(data.len() + 16);
    file.push(14);
    file.push(0x10);
    file.extend_from_slice(&2093u16.to_le_bytes());
    file.extend_from_slice(&(data.len() as u32).to_le_bytes());
    file.extend_from_slice(b".FIT");
    let header_crc = fit_crc(&file);
    file.extend_from_slice(&header_crc.to_le_bytes());
    file.extend_from_slice(&data);
    let file_crc = fit_crc(&file);
    file.extend_from_slice(&file_crc.to_le_bytes());
    file
}

/// `count` positioned samples one second apart heading north from (44, -71.5)
pub fn ride(start_unix: i64, count: usize) -> Vec<FitSample> {
    (0..count)
        .map(|i| FitSample {
            unix_seconds: start_unix + i as i64,
            position: Some((44.0 + i as f64 * 0.0001, -71.5)),
        })
        .collect()
}

pub fn write_gz(path: &Path, bytes: &[u8]) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("gzip write");
    fs::write(path, encoder.finish().expect("gzip finish")).expect("write fixture");
}

/// GPX document in the one-trackpoint-per-line layout of Strava exports
pub fn gpx_document(name: &str, iso_time: &str, points: usize) -> String {
    let mut body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<gpx creator=\"StravaGPX\" version=\"1.1\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n\
 <metadata>\n  <time>{iso_time}</time>\n </metadata>\n\
 <trk>\n  <name>{name}</name>\n  <trkseg>\n"
    );
    for i in 0..points {
        body.push_str(&format!(
            "   <trkpt lat=\"{:.7}\" lon=\"{:.7}\">\n    <ele>100.0</ele>\n   </trkpt>\n",
            44.0 + i as f64 * 0.0001,
            -71.5 - i as f64 * 0.0001
        ));
    }
    body.push_str("  </trkseg>\n </trk>\n</gpx>\n");
    body
}

//! CSV output formatting.

use crate::storage::ScanRecord;
use std::io::{self, Write};

/// Write one row per device.
pub fn write_csv<W: Write>(out: &mut W, record: &ScanRecord) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["address", "name", "category", "threat", "open_ports"])?;

    for device in &record.devices {
        let ports = device
            .open_ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(";");

        wtr.write_record([
            device.address.as_str(),
            device.resolved_name.as_deref().unwrap_or(""),
            device.category.label(),
            if device.is_threat { "yes" } else { "no" },
            ports.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanReport;
    use crate::types::{DeviceCategory, ScannedDevice};

    #[test]
    fn test_csv_rows() {
        let report = ScanReport {
            link: None,
            subnet: Some("10.0.0.0/24".to_string()),
            hosts_scanned: 2,
            duration_ms: 10,
            devices: vec![ScannedDevice::new("10.0.0.4", DeviceCategory::IpCameraDvr, true)
                .with_open_ports(vec![554])
                .with_name(Some("cam".to_string()))],
        };
        let record = ScanRecord::from_report(report, chrono::Utc::now());

        let mut buf = Vec::new();
        write_csv(&mut buf, &record).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "address,name,category,threat,open_ports");
        assert_eq!(lines[1], "10.0.0.4,cam,IP camera / DVR,yes,554");
    }
}

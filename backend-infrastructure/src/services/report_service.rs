use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tokio::fs;
use tracing::{error, info};

use backend_domain::{AnomalyRecord, AnomalyReportRow};

pub const CSV_REPORT_FILENAME: &str = "anomaly_report.csv";

/// Write the run's annotated rows as a single CSV summary under `report_dir`.
pub async fn write_csv_report(report_dir: &str, rows: &[AnomalyReportRow]) -> Result<PathBuf> {
    fs::create_dir_all(report_dir).await?;
    let path = Path::new(report_dir).join(CSV_REPORT_FILENAME);
    let content = render_csv(rows)?;
    fs::write(&path, content)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!("CSV report saved to {}", path.display());
    Ok(path)
}

pub fn render_csv(rows: &[AnomalyReportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        // serde only emits the header alongside the first row
        writer.write_record([
            "TransactionID",
            "AccountID",
            "Timestamp",
            "Amount",
            "Location",
            "AvgDailySpend",
            "Merchant",
            "TransactionType",
            "AnomalyType",
            "Narrative",
        ])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().context("flushing CSV buffer")?;
    Ok(String::from_utf8(bytes)?)
}

/// Write one HTML incident document per flagged transaction. A failed write
/// aborts that report only; the rest of the batch still lands.
pub async fn write_incident_reports(
    report_dir: &str,
    records: &[AnomalyRecord],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(report_dir).await?;
    let mut written = Vec::with_capacity(records.len());
    for record in records {
        let path = Path::new(report_dir).join(format!(
            "INCIDENT_{}.html",
            sanitize_file_stem(&record.transaction.transaction_id)
        ));
        let html = render_incident(record);
        match fs::write(&path, html).await {
            Ok(()) => {
                info!("incident report generated for {}", record.transaction.transaction_id);
                written.push(path);
            }
            Err(err) => {
                error!(
                    "failed to write incident report for {}: {}",
                    record.transaction.transaction_id, err
                );
            }
        }
    }
    Ok(written)
}

fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

pub fn render_incident(record: &AnomalyRecord) -> String {
    let txn = &record.transaction;
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let narrative = record
        .narrative
        .as_deref()
        .unwrap_or("No narrative available.");

    let detail_rows = [
        ("Timestamp", txn.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Amount", format!("${:.2}", txn.amount)),
        ("Merchant", txn.merchant.clone().unwrap_or_else(|| "-".to_string())),
        ("Location", escape_html(&txn.location)),
        ("Account Avg. Daily Spend", format!("${:.2}", txn.avg_daily_spend)),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            "<tr><th>{label}</th><td>{value}</td></tr>",
            label = label,
            value = value
        )
    })
    .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>Incident {id}</title>
<style>
body {{ font-family: "IBM Plex Sans", "Source Sans 3", sans-serif; color: #0f172a; max-width: 720px; margin: 0 auto; padding: 32px 20px; }}
h1 {{ font-size: 22px; text-align: center; }}
table {{ border-collapse: collapse; width: 100%; margin: 12px 0; }}
th {{ text-align: left; padding: 6px 10px; width: 220px; color: #64748b; font-weight: 600; }}
td {{ padding: 6px 10px; }}
tr {{ border-bottom: 1px solid #e2e8f0; }}
.anomaly {{ color: #dc2626; font-weight: 700; }}
.narrative {{ background: #f8fafc; border-radius: 10px; padding: 14px 16px; line-height: 1.5; }}
footer {{ margin-top: 28px; font-size: 12px; color: #64748b; text-align: center; font-style: italic; }}
</style>
</head>
<body>
<h1>Transaction Anomaly Incident Report</h1>
<table>
<tr><th>Report Generated</th><td>{generated_at}</td></tr>
<tr><th>Transaction ID</th><td>{id}</td></tr>
<tr><th>Account ID</th><td>{account}</td></tr>
</table>
<h2>Transaction Details</h2>
<table>
{detail_rows}
</table>
<h2>Anomaly Analysis</h2>
<table>
<tr><th>Detected Anomaly Types</th><td class="anomaly">{anomaly_type}</td></tr>
</table>
<p class="narrative">{narrative}</p>
<footer>This is an auto-generated report by the Transaction Anomaly Narrator (TAN).</footer>
</body>
</html>
"#,
        id = escape_html(&txn.transaction_id),
        account = escape_html(&txn.account_id),
        generated_at = generated_at,
        detail_rows = detail_rows,
        anomaly_type = record.anomaly_type(),
        narrative = escape_html(narrative),
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{AnomalyRule, Transaction};

    fn record(id: &str) -> AnomalyRecord {
        AnomalyRecord {
            transaction: Transaction {
                transaction_id: id.to_string(),
                account_id: "ACC-1".to_string(),
                timestamp: chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
                    .unwrap()
                    .and_hms_opt(2, 30, 0)
                    .unwrap(),
                amount: 1200.5,
                location: "Moscow".to_string(),
                avg_daily_spend: 100.0,
                merchant: Some("GadgetHub".to_string()),
                transaction_type: Some("online".to_string()),
            },
            rules: vec![AnomalyRule::HighValue, AnomalyRule::ForeignLocation],
            narrative: Some("Flagged for value & location.".to_string()),
        }
    }

    #[test]
    fn csv_report_has_expected_header_and_rows() {
        let rows = vec![record("T1").to_row(), record("T2").to_row()];
        let csv = render_csv(&rows).expect("render");
        let mut lines = csv.lines();
        let header = lines.next().expect("header");
        assert!(header.starts_with("TransactionID,AccountID,Timestamp,Amount,Location"));
        assert!(header.contains("AnomalyType"));
        assert!(header.contains("Narrative"));
        assert_eq!(lines.count(), 2);
        assert!(csv.contains("High Value, Foreign Location"));
    }

    #[test]
    fn incident_html_contains_details_and_escapes_narrative() {
        let html = render_incident(&record("T1"));
        assert!(html.contains("Transaction Anomaly Incident Report"));
        assert!(html.contains("T1"));
        assert!(html.contains("$1200.50"));
        assert!(html.contains("High Value, Foreign Location"));
        assert!(html.contains("Flagged for value &amp; location."));
    }

    #[test]
    fn incident_filename_stem_is_sanitized() {
        assert_eq!(sanitize_file_stem("TXN/2025:01"), "TXN_2025_01");
    }

    #[tokio::test]
    async fn writes_csv_and_incident_files() {
        let dir = std::env::temp_dir().join("tan-report-service-test");
        let dir_str = dir.to_str().unwrap();
        let records = vec![record("T1")];
        let rows: Vec<_> = records.iter().map(|r| r.to_row()).collect();

        let csv_path = write_csv_report(dir_str, &rows).await.expect("csv");
        assert!(csv_path.exists());

        let written = write_incident_reports(dir_str, &records).await.expect("incidents");
        assert_eq!(written.len(), 1);
        assert!(written[0].file_name().unwrap().to_str().unwrap().starts_with("INCIDENT_T1"));
    }
}

//! CSV export of an invoice list

use super::types::Invoice;

/// Write `invoices` as CSV with a header row
///
/// Columns follow the camelCase field names of [`Invoice`]; missing
/// timestamps are left empty.
pub fn to_csv(invoices: &[Invoice]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if invoices.is_empty() {
        writer.write_record(HEADER)?;
    }
    for invoice in invoices {
        writer.serialize(invoice)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

const HEADER: [&str; 12] = [
    "id",
    "clientName",
    "clientEmail",
    "amount",
    "vatPercentage",
    "vatAmount",
    "total",
    "dueDate",
    "status",
    "createdAt",
    "updatedAt",
    "currentUser",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceInput;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_csv_rows() {
        let record = InvoiceInput {
            client_name: "Ada, Obi".to_string(),
            client_email: "ada@example.com".to_string(),
            amount: 200.0,
            vat_percentage: 10.0,
            due_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            status: Default::default(),
        }
        .validate()
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();
        let invoice = Invoice::from_record("inv-1", "user-1", &record, now);

        let csv = String::from_utf8(to_csv(&[invoice]).unwrap()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some(HEADER.join(",").as_str()));
        let row = lines.next().unwrap();
        assert!(row.starts_with("inv-1,\"Ada, Obi\",ada@example.com,200.0,10.0,20.0,220.0,2024-04-20,unpaid,"));
        assert!(row.ends_with(",user-1"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_export_has_header() {
        let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), HEADER.join(","));
    }
}

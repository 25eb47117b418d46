use std::{fs, path::Path};

use crate::errors::Result;
use crate::ledger::{
    Document, Entry, Transaction, TransactionKind, Transfer, UNKNOWN_SOURCE_LABEL,
};

/// UTF-8 byte-order mark, kept so spreadsheet apps detect the encoding.
const BOM: &str = "\u{feff}";

const HEADER: [&str; 6] = [
    "Дата",
    "Тип",
    "Категория",
    "Сумма",
    "Источник",
    "Комментарий",
];

const TRANSFER_LABEL: &str = "Перевод";

/// Renders the full transaction history as CSV, one row per entry.
///
/// Transfers are included alongside plain transactions; their source column
/// shows both endpoint names since a transfer has no single source. Labels
/// for deleted sources fall back to "Неизвестно".
pub fn export_csv(document: &Document) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for entry in &document.transactions {
        let record = match entry {
            Entry::Income(txn) => transaction_record(document, TransactionKind::Income, txn),
            Entry::Expense(txn) => transaction_record(document, TransactionKind::Expense, txn),
            Entry::Transfer(transfer) => transfer_record(transfer),
        };
        writer.write_record(&record)?;
    }

    let body = writer
        .into_inner()
        .map_err(|err| err.into_error())
        .map_err(crate::errors::LedgerError::Io)?;
    let mut out = Vec::with_capacity(BOM.len() + body.len());
    out.extend_from_slice(BOM.as_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

fn transaction_record(
    document: &Document,
    kind: TransactionKind,
    txn: &Transaction,
) -> [String; 6] {
    let source = document
        .source_label(txn.source)
        .unwrap_or_else(|| UNKNOWN_SOURCE_LABEL.to_string());
    [
        txn.date.to_string(),
        kind.label().to_string(),
        txn.category.clone(),
        format!("{:.2}", txn.amount),
        source,
        txn.comment.clone(),
    ]
}

fn transfer_record(transfer: &Transfer) -> [String; 6] {
    [
        transfer.date.to_string(),
        TRANSFER_LABEL.to_string(),
        TRANSFER_LABEL.to_string(),
        format!("{:.2}", transfer.amount),
        format!("{} → {}", transfer.from_name, transfer.to_name),
        transfer.comment.clone(),
    ]
}

pub fn export_csv_to(document: &Document, path: &Path) -> Result<()> {
    let data = export_csv(document)?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{SourceRef, TransactionInput, TransactionKind, TransferInput};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_document() -> Document {
        let mut doc = Document::new();
        doc.add_bank("Kapital Bank");
        let card = doc.add_card("Основная карта", "Kapital Bank", 10_000.0);
        let cash = doc.add_cash("Кошелек", 500.0);
        doc.create_transaction(TransactionInput {
            kind: TransactionKind::Expense,
            amount: 250.5,
            source: SourceRef::card(card),
            date: date(2025, 3, 10),
            category: "Продукты".into(),
            comment: "хлеб, молоко".into(),
        })
        .unwrap();
        doc.create_transfer(TransferInput {
            from: SourceRef::card(card),
            to: SourceRef::cash(cash),
            amount: 1_000.0,
            date: date(2025, 3, 11),
            comment: String::new(),
        })
        .unwrap();
        doc
    }

    fn export_lines(doc: &Document) -> Vec<String> {
        let bytes = export_csv(doc).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn output_starts_with_a_bom_and_the_header() {
        let doc = sample_document();
        let bytes = export_csv(&doc).unwrap();
        assert!(bytes.starts_with("\u{feff}".as_bytes()));
        let lines = export_lines(&doc);
        assert_eq!(
            lines[0],
            "\u{feff}Дата,Тип,Категория,Сумма,Источник,Комментарий"
        );
    }

    #[test]
    fn rows_carry_labels_and_two_decimal_amounts() {
        let doc = sample_document();
        let lines = export_lines(&doc);
        assert_eq!(lines.len(), 3);
        let expense = &lines[1];
        assert!(expense.contains("2025-03-10"));
        assert!(expense.contains("Расход"));
        assert!(expense.contains("250.50"));
        assert!(expense.contains("Основная карта (Kapital Bank)"));
    }

    #[test]
    fn transfer_rows_show_both_endpoint_names() {
        let doc = sample_document();
        let lines = export_lines(&doc);
        let transfer = &lines[2];
        assert!(transfer.contains("Перевод"));
        assert!(transfer.contains("Основная карта (Kapital Bank) → Кошелек"));
        assert!(transfer.contains("1000.00"));
    }

    #[test]
    fn orphaned_sources_export_as_unknown() {
        let mut doc = Document::new();
        doc.add_cash("Кошелек", 5_000.0);
        doc.create_transaction(TransactionInput {
            kind: TransactionKind::Expense,
            amount: 100.0,
            source: SourceRef::cash(1),
            date: date(2025, 3, 10),
            category: "Прочее".into(),
            comment: String::new(),
        })
        .unwrap();
        doc.remove_cash(1).unwrap();
        let lines = export_lines(&doc);
        assert!(lines[1].contains(UNKNOWN_SOURCE_LABEL));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut doc = Document::new();
        doc.add_cash("Кошелек", 5_000.0);
        doc.create_transaction(TransactionInput {
            kind: TransactionKind::Expense,
            amount: 75.0,
            source: SourceRef::cash(1),
            date: date(2025, 3, 12),
            category: "Продукты".into(),
            comment: "яблоки, груши".into(),
        })
        .unwrap();
        let lines = export_lines(&doc);
        assert!(lines[1].contains("\"яблоки, груши\""));
    }
}

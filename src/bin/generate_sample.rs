//! Writes a synthetic WhatsApp call log for offline use:
//! `sample_calls.csv` (day-first date text) and `sample_calls.parquet`
//! (Date32 open date). Run with `CALLVOLUME_SOURCE=sample_calls.csv` to view.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const ROLES: [(&str, f64); 3] = [
    ("Assistente CSF", 14.0),
    ("Assistente CSF CM", 6.0),
    ("Assistente CSF Ajuda Quality", 2.5),
];

const SUBJECTS: [(&str, &str); 5] = [
    ("Cartão", "Bloqueio de cartão"),
    ("Fatura", "Segunda via de fatura"),
    ("Fatura", "Contestação de compra"),
    ("Cadastro", "Atualização de endereço"),
    ("Limite", "Aumento de limite"),
];

/// Small deterministic generator (64-bit LCG, high bits).
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(2862933555777941757)
            .wrapping_add(3037000493);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }

    /// Knuth's Poisson sampler; fine for the small rates used here.
    fn poisson(&mut self, lambda: f64) -> u32 {
        let limit = (-lambda).exp();
        let mut k = 0;
        let mut p = self.next_f64();
        while p > limit {
            k += 1;
            p *= self.next_f64();
        }
        k
    }
}

struct Row {
    case_number: i64,
    role: &'static str,
    opened: NaiveDate,
    hour: u32,
    minute: u32,
    category: &'static str,
    subject: &'static str,
}

fn generate(rng: &mut Lcg) -> Result<Vec<Row>> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).context("start date")?;
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).context("end date")?;

    let mut rows = Vec::new();
    let mut case_number = 100_000;
    let mut day = start;

    while day <= end {
        // Weekends are quieter, and December peaks.
        let weekday_factor = if day.weekday().number_from_monday() >= 6 { 0.4 } else { 1.0 };
        let season = if day.month() == 12 { 1.5 } else { 1.0 };

        for (role, base) in ROLES {
            // The quality team had no WhatsApp queue from May to July 2024.
            if role == "Assistente CSF Ajuda Quality"
                && day.year() == 2024
                && (5..=7).contains(&day.month())
            {
                continue;
            }
            for _ in 0..rng.poisson(base * weekday_factor * season) {
                let (category, subject) = SUBJECTS[rng.below(SUBJECTS.len())];
                case_number += 1;
                rows.push(Row {
                    case_number,
                    role,
                    opened: day,
                    hour: 8 + rng.below(12) as u32,
                    minute: rng.below(60) as u32,
                    category,
                    subject,
                });
            }
        }
        day += Duration::days(1);
    }
    Ok(rows)
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record([
        "Número do caso",
        "Papel do criador",
        "Data de abertura",
        "Categoria",
        "Assunto",
    ])?;
    for row in rows {
        writer.write_record([
            row.case_number.to_string(),
            row.role.to_string(),
            format!("{} {:02}:{:02}", row.opened.format("%d/%m/%Y"), row.hour, row.minute),
            row.category.to_string(),
            row.subject.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let schema = Arc::new(Schema::new(vec![
        Field::new("Número do caso", DataType::Int64, false),
        Field::new("Papel do criador", DataType::Utf8, false),
        Field::new("Data de abertura", DataType::Date32, false),
        Field::new("Categoria", DataType::Utf8, false),
        Field::new("Assunto", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.case_number))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.role))),
        Arc::new(Date32Array::from_iter_values(
            rows.iter().map(|r| (r.opened - epoch).num_days() as i32),
        )),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.category))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.subject))),
    ];
    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = Lcg(42);
    let rows = generate(&mut rng)?;
    log::info!("Generated {} cases", rows.len());

    write_csv(&rows, "sample_calls.csv")?;
    log::info!("Wrote sample_calls.csv");

    let batch = to_batch(&rows)?;
    write_parquet(&batch, "sample_calls.parquet")?;
    log::info!("Wrote sample_calls.parquet");

    let preview = batch.slice(0, batch.num_rows().min(5));
    println!("{}", pretty_format_batches(&[preview])?);
    Ok(())
}

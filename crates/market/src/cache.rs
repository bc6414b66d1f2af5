//! Local CSV copy of fetched closes (`date,close`).

use std::path::Path;

use chrono::NaiveDate;
use domain::{Price, PricePoint, PriceSeries};

use crate::error::Result;

#[derive(serde::Serialize, serde::Deserialize)]
struct CloseRow {
    date: NaiveDate,
    close: f64,
}

pub fn read_series<R: std::io::Read>(rdr: R) -> Result<PriceSeries> {
    let mut rdr = csv::Reader::from_reader(rdr);
    let mut out = Vec::new();

    for r in rdr.deserialize::<CloseRow>() {
        let row = r?;
        out.push(PricePoint {
            date: row.date,
            close: Price(row.close),
        });
    }

    Ok(PriceSeries::new(out))
}

pub fn write_series<W: std::io::Write>(w: W, series: &PriceSeries) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    for p in series.points() {
        wtr.serialize(CloseRow {
            date: p.date,
            close: p.close.0,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_cache(path: impl AsRef<Path>) -> Result<PriceSeries> {
    read_series(std::fs::File::open(path)?)
}

pub fn write_cache(path: impl AsRef<Path>, series: &PriceSeries) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    write_series(std::fs::File::create(path)?, series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_in_date_order() {
        let csv = "date,close\n2024-03-05,170.12\n2024-03-01,179.66\n";
        let s = read_series(csv.as_bytes()).unwrap();
        assert_eq!(s.closes(), vec![Price(179.66), Price(170.12)]);
        assert_eq!(s.first_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn writes_header_and_rows() {
        let s = PriceSeries::new(vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close: Price(71000.0),
        }]);

        let mut buf = Vec::new();
        write_series(&mut buf, &s).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "date,close\n2024-01-02,71000.0\n");
    }

    #[test]
    fn bad_row_is_an_error() {
        assert!(read_series("date,close\nnot-a-date,1\n".as_bytes()).is_err());
    }
}

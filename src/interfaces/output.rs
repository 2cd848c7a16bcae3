use crate::domain::payment::Payment;
use crate::error::Result;
use clap::ValueEnum;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `id,state,amount` rows with a header.
    #[default]
    Csv,
    /// One JSON object per line.
    Json,
}

/// Writes payment records to any `Write` sink (e.g., Stdout).
pub struct PaymentWriter<W: Write> {
    format: OutputFormat,
    sink: W,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(format: OutputFormat, sink: W) -> Self {
        Self { format, sink }
    }

    pub fn write_payments<I>(&mut self, payments: I) -> Result<()>
    where
        I: IntoIterator<Item = Payment>,
    {
        match self.format {
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut self.sink);
                for payment in payments {
                    writer.serialize(payment)?;
                }
                writer.flush()?;
            }
            OutputFormat::Json => {
                for payment in payments {
                    serde_json::to_writer(&mut self.sink, &payment).map_err(std::io::Error::from)?;
                    writeln!(self.sink)?;
                }
                self.sink.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, PaymentState};
    use rust_decimal_macros::dec;

    fn payment() -> Payment {
        let mut payment = Payment::new(Amount::new(dec!(100.50)).unwrap());
        payment.state = PaymentState::PreAuth;
        payment
    }

    #[test]
    fn test_csv_output() {
        let payment = payment();
        let mut buffer = Vec::new();
        PaymentWriter::new(OutputFormat::Csv, &mut buffer)
            .write_payments([payment.clone()])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("id,state,amount"));
        assert_eq!(
            lines.next(),
            Some(format!("{},PRE_AUTH,100.50", payment.id).as_str())
        );
    }

    #[test]
    fn test_json_output() {
        let payment = payment();
        let mut buffer = Vec::new();
        PaymentWriter::new(OutputFormat::Json, &mut buffer)
            .write_payments([payment.clone()])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let parsed: Payment = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed, payment);
    }

    #[test]
    fn test_empty_csv_output() {
        let mut buffer = Vec::new();
        PaymentWriter::new(OutputFormat::Csv, &mut buffer)
            .write_payments(Vec::new())
            .unwrap();
        assert!(buffer.is_empty());
    }
}

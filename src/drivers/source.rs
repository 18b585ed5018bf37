use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use crate::drivers::TraceError;
/// Named column of a simulator trace, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Time,
    VIn,
    VOut,
    I1,
    IBat,
}
impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Time,
        Channel::VIn,
        Channel::VOut,
        Channel::I1,
        Channel::IBat,
    ];
    pub fn label(self) -> &'static str {
        match self {
            Channel::Time => "time",
            Channel::VIn => "V_in",
            Channel::VOut => "V_out",
            Channel::I1 => "I_1",
            Channel::IBat => "I_Bat",
        }
    }
}
impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
/// Columns of one tab-separated simulator export. Immutable once loaded.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    pub time: Vec<f64>,
    pub v_in: Vec<f64>,
    pub v_out: Vec<f64>,
    pub i_1: Vec<f64>,
    pub i_bat: Vec<f64>,
}
impl Trace {
    pub fn from_path(path: &Path) -> Result<Self, TraceError> {
        let file = File::open(path).map_err(|source| TraceError::FileLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|err| match err {
            TraceError::FileLoad { source, .. } => TraceError::FileLoad {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }
    /// Parses a header line followed by rows of at least five numeric columns.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TraceError> {
        let mut rows = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut trace = Trace::default();
        for record in rows.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line_no = record.position().map(|pos| pos.line() as usize).unwrap_or(0);
            let mut row = [0.0f64; 5];
            for (idx, (slot, channel)) in row.iter_mut().zip(Channel::ALL).enumerate() {
                let field = record.get(idx).ok_or_else(|| TraceError::Malformed {
                    line: line_no,
                    reason: format!("missing {channel} column"),
                })?;
                *slot = field.parse().map_err(|_| TraceError::Malformed {
                    line: line_no,
                    reason: format!("{channel} value {field:?} is not a number"),
                })?;
            }
            trace.push_row(row);
        }
        if trace.len() < 2 {
            return Err(TraceError::InsufficientSamples {
                required: 2,
                actual: trace.len(),
            });
        }
        Ok(trace)
    }
    fn push_row(&mut self, row: [f64; 5]) {
        self.time.push(row[0]);
        self.v_in.push(row[1]);
        self.v_out.push(row[2]);
        self.i_1.push(row[3]);
        self.i_bat.push(row[4]);
    }
    pub fn len(&self) -> usize {
        self.time.len()
    }
    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Time => &self.time,
            Channel::VIn => &self.v_in,
            Channel::VOut => &self.v_out,
            Channel::I1 => &self.i_1,
            Channel::IBat => &self.i_bat,
        }
    }
    /// Derived from the first time step only.
    pub fn sampling_rate(&self) -> Result<f64, TraceError> {
        let (t0, t1) = match self.time.as_slice() {
            [t0, t1, ..] => (*t0, *t1),
            _ => {
                return Err(TraceError::InsufficientSamples {
                    required: 2,
                    actual: self.len(),
                })
            }
        };
        let step = t1 - t0;
        if !(step > 0.0) || !step.is_finite() {
            return Err(TraceError::InvalidSampleRate);
        }
        Ok(1.0 / step)
    }
    /// Largest relative deviation of any time step from the first one.
    pub fn step_irregularity(&self) -> f64 {
        let Some(first) = self.time.windows(2).next().map(|w| w[1] - w[0]) else {
            return 0.0;
        };
        if first == 0.0 {
            return f64::INFINITY;
        }
        self.time
            .windows(2)
            .map(|w| ((w[1] - w[0]) - first).abs() / first.abs())
            .fold(0.0, f64::max)
    }
}

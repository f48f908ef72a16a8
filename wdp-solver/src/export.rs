use crate::{Map, Program, Sense, Var};
use std::io::Write;

impl Program {
    /// Export the program in CPLEX LP format.
    ///
    /// Constraints without any terms carry no information and are written as
    /// comments.
    pub fn export_lp(&self, buffer: &mut impl Write) -> Result<(), std::io::Error> {
        writeln!(buffer, "\\ airspace slot auction winner determination")?;
        writeln!(buffer, "Maximize")?;
        writeln!(buffer, " utility: {}", self.linear(self.objective()))?;

        writeln!(buffer, "Subject To")?;
        for constraint in self.constraints() {
            if constraint.terms.is_empty() {
                writeln!(
                    buffer,
                    "\\ {}: 0 {} {}",
                    constraint.key, constraint.sense, constraint.bound
                )?;
                continue;
            }
            writeln!(
                buffer,
                " {}: {} {} {}",
                constraint.key,
                self.linear(&constraint.terms),
                constraint.sense,
                constraint.bound
            )?;
        }

        writeln!(buffer, "Binary")?;
        for (_, key) in self.variables() {
            writeln!(buffer, " {key}")?;
        }
        writeln!(buffer, "End")?;

        Ok(())
    }

    /// Export the program in (free) MPS format, with every column marked integral
    /// and bounded to [0, 1].
    pub fn export_mps(&self, buffer: &mut impl Write) -> Result<(), std::io::Error> {
        // Record layout follows
        // https://www.ibm.com/docs/en/icos/22.1.2?topic=standard-records-in-mps-format
        // with the OBJSENSE extension so readers maximize.
        writeln!(buffer, "NAME          wdp")?;
        writeln!(buffer, "OBJSENSE")?;
        writeln!(buffer, "    MAX")?;

        writeln!(buffer, "ROWS")?;
        writeln!(buffer, " N  utility")?;
        for constraint in self.constraints() {
            let sense = match constraint.sense {
                Sense::LessEqual => "L",
                Sense::Equal => "E",
            };
            writeln!(buffer, " {sense}  {}", constraint.key)?;
        }

        // The constraint matrix is stored row-wise, but MPS wants it column-wise
        let mut columns = Map::<Var, Vec<(String, f64)>>::default();
        for (var, _) in self.variables() {
            let entries = columns.entry(var).or_default();
            if let Some(&coef) = self.objective().get(&var) {
                entries.push(("utility".to_owned(), coef));
            }
        }
        for constraint in self.constraints() {
            for (var, &coef) in constraint.terms.iter() {
                columns
                    .entry(*var)
                    .or_default()
                    .push((constraint.key.to_string(), coef));
            }
        }

        writeln!(buffer, "COLUMNS")?;
        writeln!(buffer, "    MARKER    'MARKER'    'INTORG'")?;
        for (var, entries) in columns.iter() {
            let Some(key) = self.key(*var) else {
                continue;
            };
            for (row, coef) in entries {
                writeln!(buffer, "    {key}    {row}    {coef}")?;
            }
        }
        writeln!(buffer, "    MARKER    'MARKER'    'INTEND'")?;

        writeln!(buffer, "RHS")?;
        for constraint in self.constraints() {
            if constraint.bound != 0.0 {
                writeln!(buffer, "    RHS    {}    {}", constraint.key, constraint.bound)?;
            }
        }

        writeln!(buffer, "BOUNDS")?;
        for (_, key) in self.variables() {
            writeln!(buffer, " BV BND    {key}")?;
        }
        writeln!(buffer, "ENDATA")?;

        Ok(())
    }
}

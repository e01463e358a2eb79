//! Plain-text point lists: one point per line, the first three columns are
//! x y z. Columns may be separated by whitespace or commas; any further
//! columns are carried through untouched.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XyzCloud {
    header: Option<String>,
    lines: Vec<String>,
    positions: Vec<[f64; 3]>,
}

impl XyzCloud {
    pub fn from_positions(points: &[[f64; 3]]) -> Self {
        Self {
            header: None,
            lines: points
                .iter()
                .map(|[x, y, z]| format!("{x} {y} {z}"))
                .collect(),
            positions: points.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Column header line such as `x,y,z,intensity`, if the file had one.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn retain(&mut self, mask: &[bool]) {
        let mut flags = mask.iter();
        let keep: Vec<bool> = (0..self.len())
            .map(|_| flags.next().copied().unwrap_or(false))
            .collect();
        let mut keep_line = keep.iter();
        self.lines.retain(|_| *keep_line.next().unwrap_or(&false));
        let mut keep_pos = keep.iter();
        self.positions.retain(|_| *keep_pos.next().unwrap_or(&false));
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        if let Some(header) = &self.header {
            text.push_str(header);
            text.push('\n');
        }
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

fn parse_position(line: &str) -> Option<[f64; 3]> {
    let mut columns = line
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty());
    let mut next = || columns.next()?.parse::<f64>().ok();
    Some([next()?, next()?, next()?])
}

pub fn parse_xyz_str(text: &str) -> Result<XyzCloud, String> {
    let mut cloud = XyzCloud::default();
    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }
        match parse_position(line) {
            Some(position) => {
                cloud.lines.push(line.to_string());
                cloud.positions.push(position);
            }
            None if cloud.positions.is_empty() && cloud.header.is_none() => {
                cloud.header = Some(line.to_string());
            }
            None => {
                return Err(format!(
                    "Line {} is not an x y z point: '{line}'",
                    line_no + 1
                ));
            }
        }
    }
    Ok(cloud)
}

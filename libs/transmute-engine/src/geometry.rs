//! Compact hitbox notation → structured hitbox descriptors.
//!
//! Four token grammars, one per volume kind:
//!
//! | kind | token |
//! |---|---|
//! | barrier | `x,y,z`, integers or inclusive ranges `a..b` |
//! | shulker | `x,y,z scale peek [direction]` |
//! | happy ghast | `x,y,z scale [rotation] [visibility]` |
//! | interaction | `x,y,z width,height` |
//!
//! A token that does not parse is dropped whole with a warning; the rest of
//! the call is unaffected.

use std::collections::HashSet;
use std::fmt;

use transmute_api::{ConvertError, Node, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Up,
    Down,
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "north" => Some(Direction::North),
            "south" => Some(Direction::South),
            "east" => Some(Direction::East),
            "west" => Some(Direction::West),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collision or interaction volume of a furniture piece.
#[derive(Debug, Clone, PartialEq)]
pub enum Hitbox {
    /// Full solid block cell.
    Barrier { position: [i32; 3] },
    Shulker {
        position: [f64; 3],
        scale: f64,
        /// Lid opening in percent, `round(peek * 100)`.
        peek: i64,
        direction: Direction,
        seat: Option<[f64; 3]>,
    },
    HappyGhast {
        position: [f64; 3],
        scale: f64,
        seat: Option<[f64; 3]>,
    },
    Interaction {
        position: [f64; 3],
        width: f64,
        height: f64,
    },
}

impl Hitbox {
    pub fn kind(&self) -> &'static str {
        match self {
            Hitbox::Barrier { .. } => "barrier",
            Hitbox::Shulker { .. } => "shulker",
            Hitbox::HappyGhast { .. } => "happy_ghast",
            Hitbox::Interaction { .. } => "interaction",
        }
    }

    /// Target hitbox section. Scale 1, peek 0 and direction up are omitted.
    pub fn to_node(&self) -> Node {
        let mut out = Section::new();
        out.insert("type", self.kind());
        match self {
            Hitbox::Barrier { position } => {
                out.insert("position", format!("{},{},{}", position[0], position[1], position[2]));
            }
            Hitbox::Shulker {
                position,
                scale,
                peek,
                direction,
                seat,
            } => {
                out.insert("position", vector(position));
                out.set_unless("scale", *scale, 1.0);
                out.set_unless("peek", *peek, 0);
                if *direction != Direction::Up {
                    out.insert("direction", direction.as_str());
                }
                insert_seat(&mut out, seat);
            }
            Hitbox::HappyGhast {
                position,
                scale,
                seat,
            } => {
                out.insert("position", vector(position));
                out.set_unless("scale", *scale, 1.0);
                insert_seat(&mut out, seat);
            }
            Hitbox::Interaction {
                position,
                width,
                height,
            } => {
                out.insert("position", vector(position));
                out.insert("width", *width);
                out.insert("height", *height);
            }
        }
        Node::Map(out)
    }
}

fn insert_seat(out: &mut Section, seat: &Option<[f64; 3]>) {
    if let Some(seat) = seat {
        out.insert("seats", Node::List(vec![Node::Str(vector(seat))]));
    }
}

/// `"x,y,z"` with integral values printed without a fraction.
pub fn vector(v: &[f64; 3]) -> String {
    format!("{},{},{}", number(v[0]), number(v[1]), number(v[2]))
}

fn number(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Raw token lists of one furniture entry, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct HitboxTokens {
    pub barriers: Vec<String>,
    pub shulkers: Vec<String>,
    pub ghasts: Vec<String>,
    pub interactions: Vec<String>,
}

impl HitboxTokens {
    pub fn is_empty(&self) -> bool {
        self.barriers.is_empty()
            && self.shulkers.is_empty()
            && self.ghasts.is_empty()
            && self.interactions.is_empty()
    }
}

/// Decode every token of one entry, in barrier, shulker, ghast, interaction
/// order. `seat` goes to the first shulker or happy ghast produced.
pub fn decode(tokens: &HitboxTokens, seat: Option<[f64; 3]>, owner: &str) -> Vec<Hitbox> {
    let mut out = Vec::new();
    let mut seen: HashSet<[i32; 3]> = HashSet::new();
    let mut seat = seat;

    for token in &tokens.barriers {
        match parse_barrier(token) {
            Ok(cells) => {
                for position in cells {
                    if seen.insert(position) {
                        out.push(Hitbox::Barrier { position });
                    }
                }
            }
            Err(e) => warn_malformed(owner, token, &e),
        }
    }

    for token in &tokens.shulkers {
        match parse_shulker(token, owner) {
            Ok(Hitbox::Shulker {
                position,
                scale,
                peek,
                direction,
                ..
            }) => out.push(Hitbox::Shulker {
                position,
                scale,
                peek,
                direction,
                seat: seat.take(),
            }),
            Ok(other) => out.push(other),
            Err(e) => warn_malformed(owner, token, &e),
        }
    }

    for token in &tokens.ghasts {
        match parse_happy_ghast(token) {
            Ok((position, scale)) => out.push(Hitbox::HappyGhast {
                position,
                scale,
                seat: seat.take(),
            }),
            Err(e) => warn_malformed(owner, token, &e),
        }
    }

    for token in &tokens.interactions {
        match parse_interaction(token) {
            Ok(hitbox) => out.push(hitbox),
            Err(e) => warn_malformed(owner, token, &e),
        }
    }

    out
}

fn warn_malformed(owner: &str, token: &str, err: &ConvertError) {
    tracing::warn!(id = %owner, token = %token, error = %err.message, "skipping malformed hitbox token");
}

/// Most cells a single barrier token may expand to.
pub const MAX_BARRIER_CELLS: usize = 4096;

/// Every cell of `x,y,z`, x-major. Ranges `a..b` are inclusive in either order.
/// A token covering more than [`MAX_BARRIER_CELLS`] cells is malformed.
pub fn parse_barrier(token: &str) -> Result<Vec<[i32; 3]>, ConvertError> {
    let axes: Vec<&str> = token.trim().split(',').map(str::trim).collect();
    if axes.len() != 3 {
        return Err(ConvertError::malformed(format!("expected 3 axes, got {}", axes.len())));
    }
    let xs = parse_axis(axes[0])?;
    let ys = parse_axis(axes[1])?;
    let zs = parse_axis(axes[2])?;

    let count = xs
        .len()
        .checked_mul(ys.len())
        .and_then(|n| n.checked_mul(zs.len()))
        .filter(|n| *n <= MAX_BARRIER_CELLS)
        .ok_or_else(|| ConvertError::malformed(format!("more than {MAX_BARRIER_CELLS} cells")))?;

    let mut cells = Vec::with_capacity(count);
    for &x in &xs {
        for &y in &ys {
            for &z in &zs {
                cells.push([x, y, z]);
            }
        }
    }
    Ok(cells)
}

fn parse_axis(axis: &str) -> Result<Vec<i32>, ConvertError> {
    match axis.split_once("..") {
        Some((a, b)) => {
            let a = parse_int(a)?;
            let b = parse_int(b)?;
            let (lo, hi) = if a > b { (b, a) } else { (a, b) };
            if i64::from(hi) - i64::from(lo) >= MAX_BARRIER_CELLS as i64 {
                return Err(ConvertError::malformed(format!(
                    "range {lo}..{hi} spans more than {MAX_BARRIER_CELLS} cells"
                )));
            }
            Ok((lo..=hi).collect())
        }
        None => Ok(vec![parse_int(axis)?]),
    }
}

fn parse_int(s: &str) -> Result<i32, ConvertError> {
    s.trim()
        .parse()
        .map_err(|_| ConvertError::malformed(format!("not an integer: {s:?}")))
}

fn parse_float(s: &str) -> Result<f64, ConvertError> {
    if s.contains("..") {
        return Err(ConvertError::malformed(format!("ranges are not allowed here: {s:?}")));
    }
    s.trim()
        .parse()
        .map_err(|_| ConvertError::malformed(format!("not a number: {s:?}")))
}

fn parse_position(s: &str) -> Result<[f64; 3], ConvertError> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(ConvertError::malformed(format!("expected x,y,z, got {s:?}")));
    }
    Ok([parse_float(parts[0])?, parse_float(parts[1])?, parse_float(parts[2])?])
}

/// `x,y,z scale peek [direction]`. An unknown direction falls back to up.
pub fn parse_shulker(token: &str, owner: &str) -> Result<Hitbox, ConvertError> {
    let fields: Vec<&str> = token.split_whitespace().collect();
    if !(3..=4).contains(&fields.len()) {
        return Err(ConvertError::malformed(format!(
            "expected 3 or 4 fields, got {}",
            fields.len()
        )));
    }
    let position = parse_position(fields[0])?;
    let scale = parse_float(fields[1])?;
    let peek = parse_float(fields[2])?;
    let direction = match fields.get(3) {
        None => Direction::default(),
        Some(raw) => Direction::parse(raw).unwrap_or_else(|| {
            tracing::warn!(id = %owner, token = %token, direction = %raw, "unknown shulker direction, using up");
            Direction::default()
        }),
    };
    Ok(Hitbox::Shulker {
        position,
        scale,
        peek: (peek * 100.0).round() as i64,
        direction,
        seat: None,
    })
}

/// `x,y,z scale [rotation] [visibility]` → position and scale.
pub fn parse_happy_ghast(token: &str) -> Result<([f64; 3], f64), ConvertError> {
    let fields: Vec<&str> = token.split_whitespace().collect();
    if !(2..=4).contains(&fields.len()) {
        return Err(ConvertError::malformed(format!(
            "expected 2 to 4 fields, got {}",
            fields.len()
        )));
    }
    Ok((parse_position(fields[0])?, parse_float(fields[1])?))
}

/// `x,y,z width,height`.
pub fn parse_interaction(token: &str) -> Result<Hitbox, ConvertError> {
    let fields: Vec<&str> = token.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(ConvertError::malformed(format!("expected 2 fields, got {}", fields.len())));
    }
    let position = parse_position(fields[0])?;
    let size: Vec<&str> = fields[1].split(',').collect();
    if size.len() != 2 {
        return Err(ConvertError::malformed(format!("expected width,height, got {:?}", fields[1])));
    }
    Ok(Hitbox::Interaction {
        position,
        width: parse_float(size[0])?,
        height: parse_float(size[1])?,
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    fn tokens(barriers: &[&str], shulkers: &[&str], ghasts: &[&str], interactions: &[&str]) -> HitboxTokens {
        let own = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        HitboxTokens {
            barriers: own(barriers),
            shulkers: own(shulkers),
            ghasts: own(ghasts),
            interactions: own(interactions),
        }
    }

    fn barrier_cells(hitboxes: &[Hitbox]) -> Vec<[i32; 3]> {
        hitboxes
            .iter()
            .filter_map(|h| match h {
                Hitbox::Barrier { position } => Some(*position),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_barrier_ranges_cross_product() {
        let out = decode(&tokens(&["0..2,1,0..1"], &[], &[], &[]), None, "t:x");
        let cells = barrier_cells(&out);
        assert_eq!(cells.len(), 6);
        for x in 0..=2 {
            for z in 0..=1 {
                assert!(cells.contains(&[x, 1, z]));
            }
        }
    }

    #[test]
    fn test_barrier_two_by_two() {
        let out = decode(&tokens(&["0..1,1,0..1"], &[], &[], &[]), None, "t:x");
        assert_eq!(barrier_cells(&out), vec![[0, 1, 0], [0, 1, 1], [1, 1, 0], [1, 1, 1]]);
    }

    #[test]
    fn test_barrier_reversed_range_and_duplicates() {
        let out = decode(&tokens(&["2..0,0,0", "1,0,0", "0..1,0,0"], &[], &[], &[]), None, "t:x");
        assert_eq!(barrier_cells(&out), vec![[0, 0, 0], [1, 0, 0], [2, 0, 0]]);
    }

    #[test]
    fn test_malformed_barrier_skipped() {
        let out = decode(&tokens(&["0,0", "a,0,0", "0,0,0"], &[], &[], &[]), None, "t:x");
        assert_eq!(barrier_cells(&out), vec![[0, 0, 0]]);
    }

    #[test]
    fn test_oversized_barrier_skipped() {
        let out = decode(
            &tokens(&["0..3000000,0..3000000,0..3000000", "0..20,0..20,0..20", "0,0,0"], &[], &[], &[]),
            None,
            "t:x",
        );
        assert_eq!(barrier_cells(&out), vec![[0, 0, 0]]);
        assert!(parse_barrier("-2147483648..2147483647,0,0").is_err());
        assert_eq!(parse_barrier("0..15,0..15,0..15").unwrap().len(), MAX_BARRIER_CELLS);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Log output produced while `f` runs.
    fn logged<T>(f: impl FnOnce() -> T) -> (T, String) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        (out, text)
    }

    #[test]
    fn test_shulker_direction_default() {
        let (hitbox, log) = logged(|| parse_shulker("0,0.5,0 1.0 0.25", "t:x").unwrap());
        let Hitbox::Shulker { direction, peek, scale, .. } = hitbox else {
            panic!("not a shulker");
        };
        assert_eq!(direction, Direction::Up);
        assert_eq!(peek, 25);
        assert_eq!(scale, 1.0);
        assert!(!log.contains("unknown shulker direction"));

        let Hitbox::Shulker { direction, .. } = parse_shulker("0,0,0 1 0 NORTH", "t:x").unwrap() else {
            panic!("not a shulker");
        };
        assert_eq!(direction, Direction::North);
    }

    #[test]
    fn test_unknown_shulker_direction_warns() {
        let (hitbox, log) = logged(|| parse_shulker("0,0,0 1 0 sideways", "t:x").unwrap());
        let Hitbox::Shulker { direction, .. } = hitbox else {
            panic!("not a shulker");
        };
        assert_eq!(direction, Direction::Up);
        assert!(log.contains("WARN"), "{log}");
        assert!(log.contains("unknown shulker direction"), "{log}");
        assert!(log.contains("sideways"), "{log}");
    }

    #[test]
    fn test_shulker_rejects_ranges() {
        assert!(parse_shulker("0..1,0,0 1 0", "t:x").is_err());
        assert!(parse_shulker("0,0,0 1", "t:x").is_err());
    }

    #[test]
    fn test_peek_is_not_clamped() {
        let Hitbox::Shulker { peek, .. } = parse_shulker("0,0,0 1 1.5", "t:x").unwrap() else {
            panic!("not a shulker");
        };
        assert_eq!(peek, 150);
    }

    #[test]
    fn test_happy_ghast_ignores_trailing_tokens() {
        assert_eq!(parse_happy_ghast("0,1,0 2 90 false").unwrap(), ([0.0, 1.0, 0.0], 2.0));
        assert!(parse_happy_ghast("0,1,0").is_err());
    }

    #[test]
    fn test_interaction() {
        assert_eq!(
            parse_interaction("0,0.5,0 1.5,2").unwrap(),
            Hitbox::Interaction {
                position: [0.0, 0.5, 0.0],
                width: 1.5,
                height: 2.0
            }
        );
        assert!(parse_interaction("0,0,0 1").is_err());
        assert!(parse_interaction("0,0,0 1,x").is_err());
    }

    #[test]
    fn test_seat_claimed_once() {
        let out = decode(
            &tokens(&["0,0,0"], &["0,0,0 1 0", "1,0,0 1 0"], &["0,2,0 1"], &["0,0,0 1,1"]),
            Some([0.0, 0.6, 0.0]),
            "t:x",
        );
        let seats: Vec<bool> = out
            .iter()
            .filter_map(|h| match h {
                Hitbox::Shulker { seat, .. } | Hitbox::HappyGhast { seat, .. } => Some(seat.is_some()),
                _ => None,
            })
            .collect();
        assert_eq!(seats, vec![true, false, false]);
    }

    #[test]
    fn test_seat_falls_through_malformed_shulker() {
        let out = decode(&tokens(&[], &["broken"], &["0,2,0 1"], &[]), Some([0.0, 1.0, 0.0]), "t:x");
        assert!(matches!(out[0], Hitbox::HappyGhast { seat: Some(_), .. }));
    }

    #[test]
    fn test_to_node_is_sparse() {
        let node = Hitbox::Shulker {
            position: [0.0, 0.5, 0.0],
            scale: 1.0,
            peek: 0,
            direction: Direction::Up,
            seat: None,
        }
        .to_node();
        let section = node.as_section().unwrap();
        let keys: Vec<&str> = section.keys().collect();
        assert_eq!(keys, vec!["type", "position"]);
        assert_eq!(section.str_or("position", ""), "0,0.5,0");
    }
}

use crate::space::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Shape the drones are asked to fly in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationKind {
    Circle,
    Dragon,
    Robot,
    Star,
}

impl FormationKind {
    /// Place `n_points` formation points around `center`.
    ///
    /// Points are generated from angles evenly spread over a full turn.
    pub fn points(self, radius: f64, center: Point, n_points: usize) -> Vec<Point> {
        (0..n_points)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / n_points as f64;
                center + self.offset(i, angle, radius, n_points)
            })
            .collect()
    }

    fn offset(self, i: usize, t: f64, radius: f64, n_points: usize) -> Point {
        match self {
            FormationKind::Circle => Point::new(t.cos(), t.sin()) * radius,
            FormationKind::Dragon => {
                let scale = 0.8;
                let x = t.cos() + 0.5 * (3.0 * t).cos() + 0.25 * (5.0 * t).sin();
                let y = t.sin() + 0.5 * (3.0 * t).sin() + 0.25 * (5.0 * t).cos();
                Point::new(x, y) * (radius * scale)
            }
            FormationKind::Robot => robot_offset(i, t, radius, n_points),
            FormationKind::Star => {
                let r = if i % 2 == 0 { radius * 0.5 } else { radius * 0.3 };
                Point::new(t.cos(), t.sin()) * r
            }
        }
    }
}

/// Head on the first third of the points, body on the second, legs on the rest.
fn robot_offset(i: usize, t: f64, radius: f64, n_points: usize) -> Point {
    let third = n_points / 3;
    let segment = |start: usize| {
        if third == 0 {
            0.0
        } else {
            (i - start) as f64 / third as f64
        }
    };

    if i < third {
        let x = 0.7 * (t * 1.5).cos();
        let y = 0.7 * (t * 1.5).sin() + 0.5;
        Point::new(x, y) * radius
    } else if i < 2 * third {
        let s = segment(third);
        let x = 0.8 * (PI * s).cos() - 0.1;
        let y = 0.3 * (PI * s).sin() - 0.2;
        Point::new(x, y) * radius
    } else {
        let s = segment(2 * third);
        let side = if i % 2 == 0 { -0.4 } else { 0.4 };
        let x = 0.3 * (PI * s).cos() + side;
        let y = 0.5 * (PI * s).sin() - 0.8;
        Point::new(x, y) * radius
    }
}

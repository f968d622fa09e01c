//! Text rendering of the operator view.
//!
//! Every view change is printed as one line on stdout. Strokes are
//! summarised by point count, colour and bounding box.

use whiteboard_core::geometry::Point;
use whiteboard_core::render::OperatorView;

use std::io::{Write, stdout};

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Whiteboard,
}

#[derive(Debug)]
pub struct ConsoleView {
    screen: Screen,
    status: Option<String>,
    strokes_on_surface: usize,
    echo: bool,
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConsoleView {
    /// `echo = false` keeps the view state without printing.
    pub fn new(echo: bool) -> Self {
        Self {
            screen: Screen::Login,
            status: None,
            strokes_on_surface: 0,
            echo,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Polylines drawn since the surface was last cleared, outlines included.
    pub fn strokes_on_surface(&self) -> usize {
        self.strokes_on_surface
    }

    fn print(&self, line: &str) {
        if !self.echo {
            return;
        }
        let mut out = stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

impl OperatorView for ConsoleView {
    fn show_whiteboard(&mut self) {
        self.screen = Screen::Whiteboard;
        self.print("== whiteboard ==");
    }

    fn hide_whiteboard(&mut self) {
        self.screen = Screen::Login;
    }

    fn show_login(&mut self) {
        self.screen = Screen::Login;
        self.print("== login == (login <username> <password> <account>)");
    }

    fn set_status(&mut self, message: &str) {
        self.status = Some(message.to_string());
        self.print(&format!("status: {message}"));
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn draw(&mut self, points: &[Point], width: f64, color: &'static str) {
        self.strokes_on_surface += 1;
        debug!("Drawing {} points, width {width}, {color}", points.len());
        self.print(&format!("draw {color:<5} {}", describe_polyline(points)));
    }

    fn clear_surface(&mut self) {
        self.strokes_on_surface = 0;
        self.print("surface cleared");
    }
}

/// `"<n> points in (min_x,min_y)..(max_x,max_y)"`.
pub fn describe_polyline(points: &[Point]) -> String {
    let Some(first) = points.first() else {
        return "0 points".to_string();
    };

    let (min, max) = points.iter().fold((*first, *first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )
    });

    format!(
        "{} points in ({},{})..({},{})",
        points.len(),
        min.x,
        min.y,
        max.x,
        max.y
    )
}

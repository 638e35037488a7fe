//! In-memory slider widget for exercising the drag heuristics without a browser.
//!
//! Behaves like a typical range-slider component: a handle is grabbed when the
//! pointer is pressed on it, follows the pointer's x (snapped to whole values)
//! while the button is held, and is released on mouse-up.

#![allow(dead_code)]

use std::cell::RefCell;

use rangeslide::{Geometry, Point, Pointer, Rect, Result, SliderHandle};

const HANDLE_HEIGHT: f64 = 16.0;

#[derive(Debug, Clone)]
struct Thumb {
    center_x: f64,
    value: f64,
    width: f64,
}

#[derive(Debug)]
struct State {
    /// Screen x of the lowest value.
    origin: f64,
    /// Screen units per logical unit.
    scale: f64,
    lo: f64,
    hi: f64,
    track_y: f64,
    thumbs: Vec<Thumb>,
    grabbed: Option<usize>,
    /// Value attribute stops updating (position still moves).
    frozen: bool,
    /// Minimum gap between two handles; moving one pushes the other.
    push_gap: Option<f64>,
    /// Index of the grabbed handle for every press, `None` for a miss.
    presses: Vec<Option<usize>>,
    /// Screen x of every release.
    releases: Vec<f64>,
}

pub struct Widget {
    state: RefCell<State>,
}

impl Widget {
    /// Track from `origin` covering values `lo..=hi` at `scale` screen units per unit.
    pub fn new(origin: f64, scale: f64, lo: f64, hi: f64) -> Self {
        Self {
            state: RefCell::new(State {
                origin,
                scale,
                lo,
                hi,
                track_y: 300.0,
                thumbs: Vec::new(),
                grabbed: None,
                frozen: false,
                push_gap: None,
                presses: Vec::new(),
                releases: Vec::new(),
            }),
        }
    }

    /// Add a handle of `width` at `value`; returns its index.
    pub fn add_handle(&self, value: f64, width: f64) -> usize {
        let mut s = self.state.borrow_mut();
        let center_x = s.origin + (value - s.lo) * s.scale;
        s.thumbs.push(Thumb {
            center_x,
            value,
            width,
        });
        s.thumbs.len() - 1
    }

    /// Add a handle whose screen position and value disagree.
    pub fn add_handle_at(&self, center_x: f64, value: f64, width: f64) -> usize {
        let mut s = self.state.borrow_mut();
        s.thumbs.push(Thumb {
            center_x,
            value,
            width,
        });
        s.thumbs.len() - 1
    }

    pub fn frozen(self) -> Self {
        self.state.borrow_mut().frozen = true;
        self
    }

    pub fn push_gap(self, gap: f64) -> Self {
        self.state.borrow_mut().push_gap = Some(gap);
        self
    }

    pub fn handle(&self, index: usize) -> SimHandle<'_> {
        SimHandle {
            widget: self,
            index,
        }
    }

    pub fn pointer(&self) -> SimPointer<'_> {
        SimPointer { widget: self }
    }

    pub fn track(&self) -> SimTrack<'_> {
        SimTrack {
            widget: self,
            hidden: false,
        }
    }

    pub fn hidden_track(&self) -> SimTrack<'_> {
        SimTrack {
            widget: self,
            hidden: true,
        }
    }

    pub fn value(&self, index: usize) -> f64 {
        self.state.borrow().thumbs[index].value
    }

    pub fn track_y(&self) -> f64 {
        self.state.borrow().track_y
    }

    /// Number of presses issued so far.
    pub fn gestures(&self) -> usize {
        self.state.borrow().presses.len()
    }

    /// Presses that grabbed handle `index`.
    pub fn presses_on(&self, index: usize) -> usize {
        self.state
            .borrow()
            .presses
            .iter()
            .filter(|p| **p == Some(index))
            .count()
    }

    pub fn press_log(&self) -> Vec<Option<usize>> {
        self.state.borrow().presses.clone()
    }

    pub fn release_log(&self) -> Vec<f64> {
        self.state.borrow().releases.clone()
    }
}

impl State {
    fn track_rect(&self) -> Rect {
        Rect::new(self.origin, self.track_y - 2.0, (self.hi - self.lo) * self.scale, 4.0)
    }

    fn thumb_rect(&self, i: usize) -> Rect {
        let t = &self.thumbs[i];
        Rect::new(
            t.center_x - t.width / 2.0,
            self.track_y - HANDLE_HEIGHT / 2.0,
            t.width,
            HANDLE_HEIGHT,
        )
    }

    fn hit(&self, at: Point) -> Option<usize> {
        // Topmost (last drawn) handle wins.
        (0..self.thumbs.len()).rev().find(|&i| {
            let r = self.thumb_rect(i);
            let half = (r.width / 2.0).max(1.0);
            (at.x - r.center().x).abs() <= half
        })
    }

    fn snap(&self, x: f64) -> f64 {
        let raw = (x - self.origin) / self.scale + self.lo;
        raw.round().clamp(self.lo, self.hi)
    }

    fn place(&mut self, i: usize, value: f64) {
        let x = self.origin + (value - self.lo) * self.scale;
        self.thumbs[i].center_x = x;
        if !self.frozen {
            self.thumbs[i].value = value;
        }
    }

    fn drag_to(&mut self, i: usize, x: f64) {
        let value = self.snap(x);
        self.place(i, value);

        let Some(gap) = self.push_gap else {
            return;
        };
        if self.thumbs.len() != 2 {
            return;
        }
        let other = 1 - i;
        let mine = self.thumbs[i].value;
        let theirs = self.thumbs[other].value;
        // Handle 0 is the lower one in push mode.
        let pushed = if i == 0 && theirs - mine < gap {
            Some((mine + gap).min(self.hi))
        } else if i == 1 && mine - theirs < gap {
            Some((mine - gap).max(self.lo))
        } else {
            None
        };
        if let Some(v) = pushed {
            self.place(other, v);
        }
    }
}

pub struct SimHandle<'a> {
    widget: &'a Widget,
    index: usize,
}

impl Geometry for SimHandle<'_> {
    async fn bounding_box(&self) -> Result<Option<Rect>> {
        Ok(Some(self.widget.state.borrow().thumb_rect(self.index)))
    }
}

impl SliderHandle for SimHandle<'_> {
    async fn value_text(&self) -> Result<Option<String>> {
        let v = self.widget.state.borrow().thumbs[self.index].value;
        Ok(Some(format!("{}", v)))
    }

    fn label(&self) -> String {
        format!("sim-handle-{}", self.index)
    }
}

pub struct SimTrack<'a> {
    widget: &'a Widget,
    hidden: bool,
}

impl Geometry for SimTrack<'_> {
    async fn bounding_box(&self) -> Result<Option<Rect>> {
        if self.hidden {
            return Ok(None);
        }
        Ok(Some(self.widget.state.borrow().track_rect()))
    }
}

pub struct SimPointer<'a> {
    widget: &'a Widget,
}

impl Pointer for SimPointer<'_> {
    async fn move_to(&self, at: Point) -> Result<()> {
        let mut s = self.widget.state.borrow_mut();
        if let Some(i) = s.grabbed {
            s.drag_to(i, at.x);
        }
        Ok(())
    }

    async fn down(&self, at: Point) -> Result<()> {
        let mut s = self.widget.state.borrow_mut();
        let hit = s.hit(at);
        s.presses.push(hit);
        s.grabbed = hit;
        Ok(())
    }

    async fn up(&self, at: Point) -> Result<()> {
        let mut s = self.widget.state.borrow_mut();
        s.releases.push(at.x);
        if let Some(i) = s.grabbed.take() {
            s.drag_to(i, at.x);
        }
        Ok(())
    }
}

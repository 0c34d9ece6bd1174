use crate::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub capacity: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self { capacity: 30 }
    }
}

/// Fixed-capacity FIFO of recent cursor samples, oldest first.
pub struct CursorTrail {
    points: VecDeque<Vec2>,
    capacity: usize,
    // rebuilt every frame for the point batch, z = 0
    render: Vec<Vec3>,
}

impl CursorTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            render: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Vec2) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<Vec2> {
        self.points.iter().copied().collect()
    }

    /// Refills the renderable point set from the current contents.
    pub fn rebuild(&mut self) -> &[Vec3] {
        self.render.clear();
        self.render
            .extend(self.points.iter().map(|p| Vec3::new(p.x, p.y, 0.0)));
        &self.render
    }

    pub fn render_points(&self) -> &[Vec3] {
        &self.render
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

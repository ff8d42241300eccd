use crate::Vec2;
use crate::model::MindmapModel;
use entimap_core::EntityId;
use std::collections::HashMap;

/// Alpha target applied while a drag is active, so the rest of the layout
/// visibly reacts to the moved node.
const REHEAT_TARGET: f32 = 0.3;

/// Tuning constants for the force layout.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    /// Rest length of a link spring.
    ///
    /// Default: `200.0`
    pub link_distance: f32,
    /// How strongly a link pulls its endpoints toward the rest length.
    ///
    /// Default: `0.1`
    pub link_strength: f32,
    /// Pairwise node charge. Negative values repel.
    ///
    /// Default: `-500.0`
    pub charge_strength: f32,
    /// Collision circle radius per node. Larger than half the card diagonal
    /// so cards never visually stack.
    ///
    /// Default: `100.0`
    pub collision_radius: f32,
    /// The simulation goes dormant once alpha falls below this.
    ///
    /// Default: `0.001`
    pub alpha_min: f32,
    /// Per-step interpolation factor pulling alpha toward its target.
    ///
    /// Default: `0.0228` (about 300 steps from 1.0 to `alpha_min`)
    pub alpha_decay: f32,
    /// Fraction of velocity lost per step.
    ///
    /// Default: `0.4`
    pub velocity_decay: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            link_distance: 200.0,
            link_strength: 0.1,
            charge_strength: -500.0,
            collision_radius: 100.0,
            alpha_min: 0.001,
            alpha_decay: 0.0228,
            velocity_decay: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Body {
    pos: Vec2,
    vel: Vec2,
    pin: Option<Vec2>,
}

/// Discrete-time force relaxation over the mindmap's nodes.
///
/// Physics state lives here, keyed by entity id and stored in build order;
/// the display records in [`MindmapModel`] stay immutable. One call to
/// [`Simulation::step`] is one tick: forces accumulate into velocities
/// scaled by the decaying alpha, then positions advance. Pinned bodies keep
/// their assigned coordinate exactly but still push and pull everyone else.
pub struct Simulation {
    params: SimulationParams,
    ids: Vec<EntityId>,
    index: HashMap<EntityId, usize>,
    bodies: Vec<Body>,
    links: Vec<(usize, usize)>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
}

impl Simulation {
    pub fn new(model: &MindmapModel, params: SimulationParams) -> Self {
        let mut ids = Vec::with_capacity(model.nodes.len());
        let mut index = HashMap::with_capacity(model.nodes.len());
        let mut bodies = Vec::with_capacity(model.nodes.len());

        for node in &model.nodes {
            index.insert(node.id.clone(), bodies.len());
            ids.push(node.id.clone());
            bodies.push(Body {
                pos: node.spawn,
                vel: Vec2::ZERO,
                pin: None,
            });
        }

        // The model never emits dangling edges; the filter is belt and braces.
        let links = model
            .edges
            .iter()
            .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
            .collect();

        Self {
            params,
            ids,
            index,
            bodies,
            links,
            center: Vec2::ZERO,
            alpha: 1.0,
            alpha_target: 0.0,
        }
    }

    /// Whether the next [`step`](Self::step) would move anything. False for
    /// an empty graph and once alpha has decayed below `alpha_min` with no
    /// reheat pending.
    pub fn is_active(&self) -> bool {
        !self.bodies.is_empty()
            && (self.alpha >= self.params.alpha_min
                || self.alpha_target >= self.params.alpha_min)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Move the centering attractor, typically to the canvas midpoint.
    /// Safe to call every frame; does not reset any other state.
    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn position(&self, id: &EntityId) -> Option<Vec2> {
        self.index.get(id).map(|&i| self.bodies[i].pos)
    }

    /// Current positions in stable build order.
    pub fn positions(&self) -> impl Iterator<Item = (&EntityId, Vec2)> {
        self.ids.iter().zip(self.bodies.iter().map(|b| b.pos))
    }

    /// Hold a node at `pos` until [`unpin`](Self::unpin). Takes effect on
    /// the current frame, not just the next tick.
    pub fn pin(&mut self, id: &EntityId, pos: Vec2) {
        if let Some(&i) = self.index.get(id) {
            let body = &mut self.bodies[i];
            body.pin = Some(pos);
            body.pos = pos;
            body.vel = Vec2::ZERO;
        }
    }

    /// Release a pinned node back to force-driven motion.
    pub fn unpin(&mut self, id: &EntityId) {
        if let Some(&i) = self.index.get(id) {
            self.bodies[i].pin = None;
        }
    }

    /// Raise the alpha target so the layout starts reorganizing again.
    /// Called on drag start.
    pub fn reheat(&mut self) {
        self.alpha_target = REHEAT_TARGET;
        tracing::debug!(alpha = self.alpha, "simulation reheated");
    }

    /// Let alpha decay back toward rest. Called on drag end.
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Advance one tick. No-op when the simulation is dormant or empty.
    pub fn step(&mut self) {
        if !self.is_active() {
            return;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

        self.apply_link_force();
        self.apply_charge_force();
        self.integrate();
        self.apply_centering();
        self.apply_collisions();
        self.enforce_pins();
    }

    /// Each edge acts as a spring toward `link_distance`.
    fn apply_link_force(&mut self) {
        let p = self.params;
        for &(s, t) in &self.links {
            let delta = self.bodies[t].pos - self.bodies[s].pos;
            let dist = delta.length();
            let dir = delta.normalize_or_zero();
            let f = (dist - p.link_distance) * p.link_strength * self.alpha;
            self.bodies[s].vel += dir * f;
            self.bodies[t].vel -= dir * f;
        }
    }

    /// Every pair of nodes repels with force inverse to squared distance.
    /// Quadratic in node count, which is fine at mindmap scale.
    fn apply_charge_force(&mut self) {
        let p = self.params;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let delta = self.bodies[j].pos - self.bodies[i].pos;
                let d2 = delta.length_squared().max(1.0);
                let dir = delta.normalize_or_zero();
                let f = p.charge_strength * self.alpha / d2;
                self.bodies[i].vel += dir * f;
                self.bodies[j].vel -= dir * f;
            }
        }
    }

    fn integrate(&mut self) {
        let damping = 1.0 - self.params.velocity_decay;
        for body in &mut self.bodies {
            if body.pin.is_some() {
                continue;
            }
            body.vel = body.vel * damping;
            body.pos += body.vel;
        }
    }

    /// Shift unpinned nodes so the centroid drifts onto the canvas center.
    fn apply_centering(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let mut centroid = Vec2::ZERO;
        for body in &self.bodies {
            centroid += body.pos;
        }
        centroid = centroid * (1.0 / self.bodies.len() as f32);
        let shift = self.center - centroid;
        for body in &mut self.bodies {
            if body.pin.is_none() {
                body.pos += shift;
            }
        }
    }

    /// Push apart any two nodes whose collision circles overlap. A pinned
    /// node transfers its share of the correction to the other body.
    fn apply_collisions(&mut self) {
        let min_dist = self.params.collision_radius * 2.0;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let delta = self.bodies[j].pos - self.bodies[i].pos;
                let dist = delta.length();
                if dist >= min_dist || dist <= f32::EPSILON {
                    continue;
                }
                let dir = delta.normalize_or_zero();
                let overlap = min_dist - dist;
                match (self.bodies[i].pin.is_some(), self.bodies[j].pin.is_some()) {
                    (false, false) => {
                        self.bodies[i].pos -= dir * (overlap * 0.5);
                        self.bodies[j].pos += dir * (overlap * 0.5);
                    }
                    (true, false) => {
                        self.bodies[j].pos += dir * overlap;
                    }
                    (false, true) => {
                        self.bodies[i].pos -= dir * overlap;
                    }
                    (true, true) => {}
                }
            }
        }
    }

    fn enforce_pins(&mut self) {
        for body in &mut self.bodies {
            if let Some(pin) = body.pin {
                body.pos = pin;
                body.vel = Vec2::ZERO;
            }
        }
    }
}

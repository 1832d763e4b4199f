//! Per-frame simulation step
//!
//! One call advances the round by a rendered frame:
//! pointer gesture -> bond springs -> sub-stepped physics (with bonding on
//! contacts) -> per-frame body update -> queued removals -> round timer.

use glam::Vec2;

use super::body::BodyId;
use super::collision::{ProxyBody, ball_segment_collision, circle_collision, elastic_impulse};
use super::input::PointerInput;
use super::state::{RoundOutcome, Selection, SimEvent, Simulation, pair_mut};
use crate::consts::EPSILON;
use crate::normalize_angle;

/// A contact found during one inner iteration
#[derive(Debug, Clone, Copy)]
enum Contact {
    /// Body against the proxy standing in for a wall
    Wall { body: usize, proxy: ProxyBody },
    /// Two live bodies
    Pair { a: usize, b: usize },
}

/// Advance the simulation by one rendered frame and return what happened
pub fn tick(sim: &mut Simulation, input: &PointerInput, dt: f32) -> Vec<SimEvent> {
    sim.handle_pointer(input);

    if dt.is_finite() && dt > 0.0 {
        sim.apply_bond_forces();
        sim.simulate(dt);
        sim.finish_frame();
        sim.flush_removals();

        if !sim.is_over() {
            sim.time_left -= dt;
            if sim.time_left <= 0.0 {
                sim.time_left = 0.0;
                sim.end_round(RoundOutcome::TimeUp);
            }
        }
        sim.frames += 1;
    }

    std::mem::take(&mut sim.events)
}

impl Simulation {
    /// Step without pointer input
    pub fn step(&mut self, dt: f32) -> Vec<SimEvent> {
        tick(self, &PointerInput::default(), dt)
    }

    /// Select / drag / shoot
    fn handle_pointer(&mut self, input: &PointerInput) {
        let pointer = input.position;

        if input.any_pressed() {
            self.selection = self
                .bodies
                .iter()
                .filter(|b| b.contains_point(pointer) && !self.pending_removal.contains(&b.id))
                .min_by(|a, b| {
                    a.cached_position
                        .distance_squared(pointer)
                        .total_cmp(&b.cached_position.distance_squared(pointer))
                })
                .map(|b| Selection::Body(b.id));

            if self.selection.is_none() && input.drag.pressed {
                self.selection = self.segments.iter().enumerate().find_map(|(index, seg)| {
                    seg.endpoint_at(pointer)
                        .map(|end| Selection::Segment { index, end })
                });
            }
        }

        if input.drag.held {
            match self.selection {
                Some(Selection::Body(id)) => {
                    if let Some(body) = self.body_mut(id) {
                        body.place(pointer);
                    }
                }
                Some(Selection::Segment { index, end }) => {
                    if let Some(segment) = self.segments.get_mut(index) {
                        segment.move_end(end, pointer);
                    }
                }
                None => {}
            }
        }

        if input.drag.released {
            self.selection = None;
        }

        if input.shoot.released {
            if let Some(Selection::Body(id)) = self.selection {
                let shoot_force = self.settings.shoot_force;
                if let Some(body) = self.body_mut(id) {
                    body.apply_force(shoot_force * (body.cached_position - pointer));
                    body.set_ready(true);
                    log::debug!("Shot body {} (armed: {})", id, body.is_ready());
                }
            }
            self.selection = None;
        }
    }

    /// Springs pulling bonded catoms toward a comfortable spacing
    fn apply_bond_forces(&mut self) {
        let spacing = self.settings.bond_spacing;
        let mut forces: Vec<(usize, Vec2)> = Vec::new();

        for (i, body) in self.bodies.iter().enumerate() {
            let Some(bonding) = body.bonding() else {
                continue;
            };
            if bonding.bonds.is_empty() {
                continue;
            }
            let k = bonding.attraction / bonding.bonds.len() as f32;

            let mut total = Vec2::ZERO;
            for &partner_id in &bonding.bonds {
                let Some(partner) = self.body(partner_id) else {
                    continue;
                };
                let diff = partner.position - body.position;
                let r = diff.length();
                if r <= EPSILON {
                    continue;
                }
                let rest = body.radius() + partner.radius() + spacing;
                let stretch = r - rest;
                total += (stretch * stretch.abs() / rest * k) * (diff / r);
            }
            forces.push((i, total));
        }

        for (i, force) in forces {
            self.bodies[i].apply_force(force);
        }
    }

    /// Fixed multi-epoch sub-stepping over `dt`
    fn simulate(&mut self, dt: f32) {
        let epochs = self.settings.epochs();
        let budget = dt / epochs as f32;
        let mut contacts: Vec<Contact> = Vec::new();

        for _ in 0..epochs {
            for body in &mut self.bodies {
                body.sim_time_remaining = budget;
                body.cached_position = body.position;
            }

            for _ in 0..self.settings.max_simulation_steps {
                self.integrate();
                self.collide_with_walls(&mut contacts);
                self.collide_bodies(&mut contacts);
                self.consume_time();
                self.resolve_contacts(&contacts);
                contacts.clear();

                let settled = self
                    .bodies
                    .iter()
                    .all(|b| b.sim_time_remaining <= EPSILON || b.velocity == Vec2::ZERO);
                if settled {
                    break;
                }
            }

            for body in &mut self.bodies {
                body.position = body.cached_position;
            }
        }
    }

    /// Move every body with time left, then clear its accumulated force
    fn integrate(&mut self) {
        let w = self.settings.field_width;
        let h = self.settings.field_height;
        let start_speed = self.settings.start_speed;
        let rest_sq = self.settings.rest_speed_sq;

        for body in &mut self.bodies {
            if body.sim_time_remaining <= 0.0 {
                continue;
            }
            let t = body.sim_time_remaining;
            body.old_position = body.cached_position;
            body.velocity += body.acceleration * t;
            body.cached_position += body.velocity * t;
            body.acceleration = Vec2::ZERO;

            // Rescue bodies that escaped the field entirely
            let r = body.radius();
            let p = body.cached_position;
            let escaped_x = p.x < -r || p.x >= w + r;
            let escaped_y = p.y < -r || p.y >= h + r;
            if escaped_x || escaped_y {
                log::warn!("Body {} escaped the field at ({:.1}, {:.1})", body.id, p.x, p.y);
                if escaped_x {
                    body.cached_position.x = w / 2.0;
                }
                if escaped_y {
                    body.cached_position.y = h / 2.0;
                }
                body.velocity = body.velocity.clamp_length_max(start_speed);
            }

            if body.velocity.length_squared() < rest_sq {
                body.velocity = Vec2::ZERO;
            }
        }
    }

    /// Overlap against walls: the wall never moves, the body takes the whole correction
    fn collide_with_walls(&mut self, contacts: &mut Vec<Contact>) {
        for (index, body) in self.bodies.iter_mut().enumerate() {
            for segment in &self.segments {
                let result = ball_segment_collision(
                    body.cached_position,
                    body.radius(),
                    body.old_position,
                    segment,
                );
                if !result.hit {
                    continue;
                }
                let proxy = ProxyBody::for_wall(result.point, segment.radius, body.velocity, body.mass());
                contacts.push(Contact::Wall { body: index, proxy });
                body.cached_position += result.normal * result.penetration;
            }
        }
    }

    /// Overlap between every unordered pair of bodies
    fn collide_bodies(&mut self, contacts: &mut Vec<Contact>) {
        let n = self.bodies.len();
        let max_spin = self.settings.max_angular_speed;

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                if !a.overlaps(b) {
                    continue;
                }
                contacts.push(Contact::Pair { a: i, b: j });

                self.handle_contact(i, j);

                let (a, b) = pair_mut(&mut self.bodies, i, j);
                let result = circle_collision(a.cached_position, a.radius(), b.cached_position, b.radius());
                if result.hit {
                    let half = result.normal * (0.5 * result.penetration);
                    a.cached_position += half;
                    b.cached_position -= half;
                }

                a.randomize_spin(&mut self.rng, max_spin);
                b.randomize_spin(&mut self.rng, max_spin);
            }
        }
    }

    /// Charge each body for the time its actual displacement represents
    fn consume_time(&mut self) {
        for body in &mut self.bodies {
            let speed = body.velocity.length();
            if speed <= EPSILON {
                continue;
            }
            let moved = body.cached_position.distance(body.old_position);
            body.sim_time_remaining = (body.sim_time_remaining - moved / speed).max(0.0);
        }
    }

    /// Elastic impulses for every contact of this iteration
    fn resolve_contacts(&mut self, contacts: &[Contact]) {
        let bonded_damping = self.settings.bonded_damping;

        for contact in contacts {
            match *contact {
                Contact::Wall { body, proxy } => {
                    let body = &mut self.bodies[body];
                    if let Some((velocity, _)) = elastic_impulse(body.impactor(), proxy.impactor(), 1.0) {
                        body.velocity = velocity;
                    }
                }
                Contact::Pair { a, b } => {
                    let (a, b) = pair_mut(&mut self.bodies, a, b);
                    let damp = if a.is_bonded_to(b.id) && b.is_bonded_to(a.id) {
                        bonded_damping
                    } else {
                        1.0
                    };
                    if let Some((va, vb)) = elastic_impulse(a.impactor(), b.impactor(), damp) {
                        a.velocity = va;
                        b.velocity = vb;
                    }
                }
            }
        }
    }

    /// Bonding check for a body contact
    fn handle_contact(&mut self, i: usize, j: usize) {
        if self.is_over() {
            return;
        }
        let (a, b) = (&self.bodies[i], &self.bodies[j]);
        if a.bonding().is_none() || b.bonding().is_none() {
            return;
        }
        if !(a.is_ready() || b.is_ready()) {
            return;
        }
        if self.pending_removal.contains(&a.id) || self.pending_removal.contains(&b.id) {
            return;
        }

        let (armed, partner) = if a.is_ready() { (a.id, b.id) } else { (b.id, a.id) };
        self.attempt_bond(armed, partner);
    }

    fn symbol_of(&self, id: BodyId) -> String {
        self.body(id)
            .and_then(|b| b.symbol())
            .unwrap_or_default()
            .to_string()
    }

    /// Armed catom `armed` touched `partner`: bond or fail against the current target
    fn attempt_bond(&mut self, armed: BodyId, partner: BodyId) {
        let Some(target) = self.targets.current() else {
            return;
        };

        let consumer = if !self.consumed.contains(&armed) {
            Some(armed)
        } else if !self.consumed.contains(&partner) {
            Some(partner)
        } else {
            None
        };

        let fits = match consumer {
            Some(consumer) => {
                let other = if consumer == armed { partner } else { armed };
                let consumer_fits = target.contains(&self.symbol_of(consumer));
                let other_fits = self.assembly.contains(&other)
                    || self.consumed.contains(&other)
                    || target.contains(&self.symbol_of(other));
                consumer_fits && other_fits
            }
            None => true,
        };

        if fits {
            self.bond_success(armed, partner, consumer);
        } else {
            self.bond_failure(armed, partner);
        }
    }

    fn bond_success(&mut self, armed: BodyId, partner: BodyId, consumer: Option<BodyId>) {
        let consumed = match consumer {
            Some(id) => {
                let symbol = self.symbol_of(id);
                if let Some(target) = self.targets.current_mut() {
                    target.consume(&symbol);
                }
                self.consumed.insert(id);
                Some(symbol)
            }
            None => None,
        };

        self.assembly.insert(armed);
        self.assembly.insert(partner);
        self.bond(armed, partner);
        for id in [armed, partner] {
            if let Some(body) = self.body_mut(id) {
                body.set_ready(false);
            }
        }

        log::debug!(
            "Bond {} <-> {} (consumed {:?}), remaining {}",
            armed,
            partner,
            consumed,
            self.targets
                .current()
                .map(|m| m.formula())
                .unwrap_or_default()
        );
        self.events.push(SimEvent::BondFormed {
            a: armed,
            b: partner,
            consumed,
        });

        if self.targets.current().is_some_and(|m| m.is_empty()) {
            self.complete_target();
        }
    }

    fn complete_target(&mut self) {
        let Some(molecule) = self.targets.advance() else {
            return;
        };
        let members: Vec<BodyId> = self.assembly.iter().copied().collect();
        self.score += 1;

        if self.settings.clear_completed {
            for &id in &members {
                self.pending_removal.insert(id);
            }
        }
        self.assembly.clear();
        self.consumed.clear();

        log::debug!("Completed {} with {} catoms", molecule.name, members.len());
        self.events.push(SimEvent::TargetCompleted {
            name: molecule.name,
            members,
        });

        if self.targets.is_empty() {
            self.end_round(RoundOutcome::Completed);
        }
    }

    fn bond_failure(&mut self, armed: BodyId, partner: BodyId) {
        self.events.push(SimEvent::BondFailed { a: armed, b: partner });

        for id in [armed, partner] {
            if !self.assembly.contains(&id) {
                self.pending_removal.insert(id);
            }
            if let Some(body) = self.body_mut(id) {
                body.set_ready(false);
            }
        }

        if let Some(molecule) = self.targets.advance() {
            log::debug!("Bond {} -> {} failed, forfeiting {}", armed, partner, molecule.name);
            self.events.push(SimEvent::TargetForfeited {
                name: molecule.name.clone(),
                remaining: molecule,
            });
        }
        self.assembly.clear();
        self.consumed.clear();
        self.lives = self.lives.saturating_sub(1);

        if self.lives == 0 {
            self.end_round(RoundOutcome::OutOfLives);
        } else if self.targets.is_empty() {
            self.end_round(RoundOutcome::Completed);
        }
    }

    /// Per-frame body update: spin, drag, re-arm timeout
    fn finish_frame(&mut self) {
        let max_speed_sq = self.settings.max_speed_sq;
        let drag = self.settings.drag;
        let start_speed = self.settings.start_speed;

        for body in &mut self.bodies {
            body.rotation = normalize_angle(body.rotation + body.angular_velocity);
            if body.velocity.length_squared() > max_speed_sq {
                body.velocity *= drag;
            }
            if body.is_ready() && body.speed() < start_speed {
                body.set_ready(false);
            }
        }
    }
}

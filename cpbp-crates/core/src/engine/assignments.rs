use enumset::EnumSet;

use crate::basic_types::EmptyDomain;
use crate::belief::Belief;
use crate::belief::BeliefRepresentation;
use crate::containers::KeyedVec;
use crate::containers::SparseSet;
use crate::cpbp_assert_advanced;
use crate::cpbp_assert_moderate;
use crate::cpbp_assert_simple;
use crate::engine::notifications::DomainEvent;
use crate::engine::variables::DomainId;

/// The arena holding the domains and the beliefs of all variables of a solver.
///
/// Every mutation which narrows a domain records the corresponding [`DomainEvent`]s; the engine
/// drains them to enqueue the watching propagators. A mutation which would leave a domain empty is
/// rejected with [`EmptyDomain`] and leaves the domain untouched, so a domain is never observed
/// with size zero.
#[derive(Debug, Clone)]
pub struct Assignments {
    domains: KeyedVec<DomainId, IntegerDomain>,
    representation: BeliefRepresentation,
    events: Vec<(DomainEvent, DomainId)>,
}

impl Default for Assignments {
    fn default() -> Self {
        Assignments::new(BeliefRepresentation::default())
    }
}

impl Assignments {
    pub(crate) fn new(representation: BeliefRepresentation) -> Self {
        Assignments {
            domains: KeyedVec::default(),
            representation,
            events: Vec::new(),
        }
    }

    /// The representation in which all beliefs of this arena are stored.
    pub fn representation(&self) -> BeliefRepresentation {
        self.representation
    }

    pub fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.domains.keys()
    }

    /// Creates a new domain `[lower_bound, upper_bound]` with uniform beliefs.
    pub(crate) fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        cpbp_assert_simple!(lower_bound <= upper_bound, "cannot create an empty domain");
        self.grow_sparse((lower_bound..=upper_bound).collect())
    }

    /// Creates a new domain containing exactly `values` with uniform beliefs.
    pub(crate) fn grow_sparse(&mut self, mut values: Vec<i32>) -> DomainId {
        values.sort_unstable();
        values.dedup();
        cpbp_assert_simple!(!values.is_empty(), "cannot create an empty domain");

        self.domains
            .push(IntegerDomain::new(&values, self.representation))
    }

    pub(crate) fn lower_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].lower_bound
    }

    pub(crate) fn upper_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].upper_bound
    }

    pub(crate) fn size(&self, domain: DomainId) -> usize {
        self.domains[domain].values.len()
    }

    pub(crate) fn contains(&self, domain: DomainId, value: i32) -> bool {
        self.domains[domain].contains(value)
    }

    /// Iterates over the values of the domain in ascending order.
    pub(crate) fn iterate_domain(&self, domain: DomainId) -> impl Iterator<Item = i32> + '_ {
        let domain = &self.domains[domain];
        (domain.lower_bound..=domain.upper_bound).filter(|&value| domain.contains(value))
    }

    /// The `index`-th value of the domain in storage order; `index` should be smaller than the size
    /// of the domain.
    pub(crate) fn value_at(&self, domain: DomainId, index: usize) -> i32 {
        let domain = &self.domains[domain];
        domain.value_of(*domain.values.get(index))
    }

    pub(crate) fn remove(&mut self, domain: DomainId, value: i32) -> Result<(), EmptyDomain> {
        let events = self.domains[domain].remove(value)?;
        self.record(domain, events);
        Ok(())
    }

    pub(crate) fn assign(&mut self, domain: DomainId, value: i32) -> Result<(), EmptyDomain> {
        let events = self.domains[domain].assign(value)?;
        self.record(domain, events);
        Ok(())
    }

    /// Removes every value strictly smaller than `value`.
    pub(crate) fn remove_below(&mut self, domain: DomainId, value: i32) -> Result<(), EmptyDomain> {
        let events = self.domains[domain].remove_below(value)?;
        self.record(domain, events);
        Ok(())
    }

    /// Removes every value strictly larger than `value`.
    pub(crate) fn remove_above(&mut self, domain: DomainId, value: i32) -> Result<(), EmptyDomain> {
        let events = self.domains[domain].remove_above(value)?;
        self.record(domain, events);
        Ok(())
    }

    fn record(&mut self, domain: DomainId, events: EnumSet<DomainEvent>) {
        self.events
            .extend(events.iter().map(|event| (event, domain)));
    }

    pub(crate) fn drain_domain_events(
        &mut self,
    ) -> impl Iterator<Item = (DomainEvent, DomainId)> + '_ {
        self.events.drain(..)
    }

    pub(crate) fn clear_domain_events(&mut self) {
        self.events.clear();
    }

    /// The belief of `value`; values outside the domain have belief zero.
    pub(crate) fn marginal(&self, domain: DomainId, value: i32) -> Belief {
        let domain_data = &self.domains[domain];
        if !domain_data.contains(value) {
            return self.representation.zero();
        }

        let belief = domain_data.marginals[domain_data.index_of(value)];
        cpbp_assert_simple!(
            self.representation.is_in_range(belief),
            "the belief {belief} of value {value} of {domain} is out of range"
        );
        belief
    }

    pub(crate) fn set_marginal(&mut self, domain: DomainId, value: i32, belief: Belief) {
        cpbp_assert_simple!(
            self.domains[domain].contains(value),
            "cannot set the belief of {value} which is not in the domain of {domain}"
        );
        cpbp_assert_simple!(
            self.representation.is_in_range(belief),
            "the belief {belief} for value {value} of {domain} is out of range"
        );

        let domain_data = &mut self.domains[domain];
        let index = domain_data.index_of(value);
        domain_data.marginals[index] = belief;
    }

    pub(crate) fn reset_marginals(&mut self, domain: DomainId) {
        self.domains[domain].reset_marginals(self.representation);
    }

    pub(crate) fn normalize_marginals(&mut self, domain: DomainId) {
        self.domains[domain].normalize_marginals(self.representation);
    }

    pub(crate) fn reset_all_marginals(&mut self) {
        let representation = self.representation;
        self.domains
            .iter_mut()
            .for_each(|domain| domain.reset_marginals(representation));
    }

    pub(crate) fn normalize_all_marginals(&mut self) {
        let representation = self.representation;
        self.domains
            .iter_mut()
            .for_each(|domain| domain.normalize_marginals(representation));
    }

    /// A copy of all beliefs, used to measure how much they change during a round of belief
    /// propagation.
    pub(crate) fn snapshot_marginals(&self) -> Vec<Vec<Belief>> {
        self.domains
            .iter()
            .map(|domain| domain.marginals.clone())
            .collect()
    }

    /// The largest difference, in probability space, between the current beliefs and those of
    /// `snapshot`.
    pub(crate) fn max_marginal_change(&self, snapshot: &[Vec<Belief>]) -> f64 {
        cpbp_assert_simple!(snapshot.len() == self.domains.len());
        let representation = self.representation;

        self.domains
            .iter()
            .zip(snapshot)
            .flat_map(|(domain, previous)| {
                domain
                    .values
                    .iter()
                    .map(move |&index| (domain.marginals[index as usize], previous[index as usize]))
            })
            .map(|(current, previous)| {
                (representation.to_probability(current) - representation.to_probability(previous))
                    .abs()
            })
            .fold(0.0, f64::max)
    }
}

/// The domain of a single variable together with its beliefs.
///
/// Values are stored relative to the initial lower bound (`offset`) in a sparse-set, and the beliefs
/// are indexed the same way.
#[derive(Debug, Clone)]
struct IntegerDomain {
    offset: i32,
    values: SparseSet<u32>,
    lower_bound: i32,
    upper_bound: i32,
    marginals: Vec<Belief>,
}

fn index_mapping(index: &u32) -> usize {
    *index as usize
}

impl IntegerDomain {
    /// `values` has to be sorted, deduplicated and non-empty.
    fn new(values: &[i32], representation: BeliefRepresentation) -> IntegerDomain {
        let offset = values[0];
        let upper_bound = values[values.len() - 1];

        let indices = values
            .iter()
            .map(|&value| (value - offset) as u32)
            .collect::<Vec<_>>();

        let mut marginals = vec![representation.zero(); (upper_bound - offset) as usize + 1];
        let uniform = representation.from_probability(1.0 / values.len() as f64);
        for &index in &indices {
            marginals[index as usize] = uniform;
        }

        IntegerDomain {
            offset,
            values: SparseSet::new(indices, index_mapping),
            lower_bound: offset,
            upper_bound,
            marginals,
        }
    }

    fn index_of(&self, value: i32) -> usize {
        (value - self.offset) as usize
    }

    fn value_of(&self, index: u32) -> i32 {
        self.offset + index as i32
    }

    fn contains(&self, value: i32) -> bool {
        self.lower_bound <= value
            && value <= self.upper_bound
            && self.values.contains(&((value - self.offset) as u32))
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn remove(&mut self, value: i32) -> Result<EnumSet<DomainEvent>, EmptyDomain> {
        if !self.contains(value) {
            return Ok(EnumSet::empty());
        }
        if self.size() == 1 {
            return Err(EmptyDomain);
        }

        let _ = self.values.remove(&((value - self.offset) as u32));
        let mut events = EnumSet::only(DomainEvent::Removal);

        if value == self.lower_bound {
            self.lower_bound = (value + 1..=self.upper_bound)
                .find(|&candidate| self.contains(candidate))
                .unwrap_or(self.upper_bound);
            events |= DomainEvent::LowerBound;
        }
        if value == self.upper_bound {
            self.upper_bound = (self.lower_bound..value)
                .rev()
                .find(|&candidate| self.contains(candidate))
                .unwrap_or(self.lower_bound);
            events |= DomainEvent::UpperBound;
        }
        if self.size() == 1 {
            events |= DomainEvent::Assign;
        }

        self.verify_consistency();
        Ok(events)
    }

    fn assign(&mut self, value: i32) -> Result<EnumSet<DomainEvent>, EmptyDomain> {
        if !self.contains(value) {
            return Err(EmptyDomain);
        }
        if self.size() == 1 {
            return Ok(EnumSet::empty());
        }

        let _ = self.values.keep_only(&((value - self.offset) as u32));
        let mut events = DomainEvent::Removal | DomainEvent::Assign;
        if self.lower_bound != value {
            events |= DomainEvent::LowerBound;
        }
        if self.upper_bound != value {
            events |= DomainEvent::UpperBound;
        }
        self.lower_bound = value;
        self.upper_bound = value;

        self.verify_consistency();
        Ok(events)
    }

    fn remove_below(&mut self, value: i32) -> Result<EnumSet<DomainEvent>, EmptyDomain> {
        if value <= self.lower_bound {
            return Ok(EnumSet::empty());
        }
        if value > self.upper_bound {
            return Err(EmptyDomain);
        }

        // The upper bound is a member, so a new lower bound always exists.
        let new_lower_bound = (value..=self.upper_bound)
            .find(|&candidate| self.contains(candidate))
            .unwrap_or(self.upper_bound);
        for removed in self.lower_bound..new_lower_bound {
            let _ = self.values.remove(&((removed - self.offset) as u32));
        }
        self.lower_bound = new_lower_bound;

        Ok(self.bound_events(DomainEvent::LowerBound))
    }

    fn remove_above(&mut self, value: i32) -> Result<EnumSet<DomainEvent>, EmptyDomain> {
        if value >= self.upper_bound {
            return Ok(EnumSet::empty());
        }
        if value < self.lower_bound {
            return Err(EmptyDomain);
        }

        let new_upper_bound = (self.lower_bound..=value)
            .rev()
            .find(|&candidate| self.contains(candidate))
            .unwrap_or(self.lower_bound);
        for removed in new_upper_bound + 1..=self.upper_bound {
            let _ = self.values.remove(&((removed - self.offset) as u32));
        }
        self.upper_bound = new_upper_bound;

        Ok(self.bound_events(DomainEvent::UpperBound))
    }

    fn bound_events(&self, bound: DomainEvent) -> EnumSet<DomainEvent> {
        self.verify_consistency();

        let mut events = DomainEvent::Removal | bound;
        if self.size() == 1 {
            events |= DomainEvent::Assign;
        }
        events
    }

    fn reset_marginals(&mut self, representation: BeliefRepresentation) {
        for &index in self.values.iter() {
            self.marginals[index as usize] = representation.one();
        }
    }

    fn normalize_marginals(&mut self, representation: BeliefRepresentation) {
        let total = representation.summation(
            self.values
                .iter()
                .map(|&index| self.marginals[index as usize]),
        );

        if representation.is_zero(total) {
            let uniform = representation.from_probability(1.0 / self.size() as f64);
            for &index in self.values.iter() {
                self.marginals[index as usize] = uniform;
            }
            return;
        }

        for &index in self.values.iter() {
            let belief = &mut self.marginals[index as usize];
            *belief = representation.divide(*belief, total);
        }

        cpbp_assert_advanced!(self
            .values
            .iter()
            .all(|&index| representation.is_in_range(self.marginals[index as usize])));
    }

    fn verify_consistency(&self) {
        cpbp_assert_moderate!(
            self.contains(self.lower_bound) && self.contains(self.upper_bound),
            "the bounds of a domain have to be members of the domain"
        );
        cpbp_assert_moderate!(
            (self.size() == 1) == (self.lower_bound == self.upper_bound),
            "a domain is assigned if and only if its bounds coincide"
        );
    }
}

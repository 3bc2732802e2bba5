//! Group filtering.
//!
//! Every participant carries a [`CollisionGroup`]. A rule for group `G` lists
//! the groups `G` *detects* (a collision is reported to `G`) and the groups
//! `G` *resolves* against (`G` is pushed around by them). A pair collides when
//! either side detects the other; each side is then resolved independently.
//! Groups do not collide with themselves unless their rule says so.

/// Collision group tags.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum CollisionGroup {
    Player = 0,
    PlayerBox,
    Platforms,
    SoftPlatforms,
    Wall,
    Pillar,
    Npcs,
    NpcsInvulnerable,
    EnemyProjectiles,
    FriendlyProjectiles,
    Sensors,
    ShootOnly,
    #[default]
    Default,
}

impl CollisionGroup {
    pub const COUNT: usize = 13;

    pub const ALL: [CollisionGroup; Self::COUNT] = [
        CollisionGroup::Player,
        CollisionGroup::PlayerBox,
        CollisionGroup::Platforms,
        CollisionGroup::SoftPlatforms,
        CollisionGroup::Wall,
        CollisionGroup::Pillar,
        CollisionGroup::Npcs,
        CollisionGroup::NpcsInvulnerable,
        CollisionGroup::EnemyProjectiles,
        CollisionGroup::FriendlyProjectiles,
        CollisionGroup::Sensors,
        CollisionGroup::ShootOnly,
        CollisionGroup::Default,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A set of groups, one bit per group.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct GroupSet(u16);

impl GroupSet {
    pub const EMPTY: Self = Self(0);

    pub fn of(groups: &[CollisionGroup]) -> Self {
        groups.iter().fold(Self::EMPTY, |set, g| set.with(*g))
    }

    #[inline]
    pub const fn with(self, g: CollisionGroup) -> Self {
        Self(self.0 | (1 << g as u16))
    }

    #[inline]
    pub const fn contains(self, g: CollisionGroup) -> bool {
        self.0 & (1 << g as u16) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_subset(self, other: GroupSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = CollisionGroup> {
        CollisionGroup::ALL.into_iter().filter(move |g| self.contains(*g))
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CollisionRule {
    pub detects: GroupSet,
    pub resolves: GroupSet,
}

/// Which sides of a pair are notified and which are physically resolved.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CollisionFlags {
    pub detect_a: bool,
    pub detect_b: bool,
    pub resolve_a: bool,
    pub resolve_b: bool,
}

impl CollisionFlags {
    #[inline]
    pub fn any_detect(&self) -> bool {
        self.detect_a || self.detect_b
    }
}

/// Immutable rule table, built once and handed to every collision by reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollisionRules {
    rules: [CollisionRule; CollisionGroup::COUNT],
}

impl Default for CollisionRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl CollisionRules {
    /// Nothing collides with anything.
    pub fn empty() -> Self {
        Self {
            rules: [CollisionRule::default(); CollisionGroup::COUNT],
        }
    }

    pub fn with_rule(
        mut self,
        group: CollisionGroup,
        detects: &[CollisionGroup],
        resolves: &[CollisionGroup],
    ) -> Self {
        let rule = CollisionRule {
            detects: GroupSet::of(detects),
            resolves: GroupSet::of(resolves),
        };
        debug_assert!(
            rule.resolves.is_subset(rule.detects),
            "{group:?} resolves against groups it does not detect"
        );
        self.rules[group.index()] = rule;
        self
    }

    /// The game's table of who detects and resolves against whom.
    pub fn standard() -> Self {
        use CollisionGroup::*;

        Self::empty()
            .with_rule(
                Player,
                &[Platforms, SoftPlatforms, Wall, Pillar, Npcs, EnemyProjectiles, Default],
                &[Platforms, SoftPlatforms, Wall, Pillar, Default],
            )
            .with_rule(
                PlayerBox,
                &[Platforms, SoftPlatforms, Wall, Pillar, Default],
                &[Platforms, SoftPlatforms, Wall, Pillar, Default],
            )
            .with_rule(Platforms, &[Player], &[])
            .with_rule(SoftPlatforms, &[Player], &[])
            .with_rule(Wall, &[], &[])
            .with_rule(
                Pillar,
                &[Platforms, SoftPlatforms, Wall, FriendlyProjectiles, EnemyProjectiles, Default],
                &[Platforms, SoftPlatforms, Wall, FriendlyProjectiles, EnemyProjectiles, Default],
            )
            .with_rule(
                Npcs,
                &[Player, Platforms, SoftPlatforms, Wall, Pillar, FriendlyProjectiles, Default],
                &[Platforms, SoftPlatforms, Wall, Pillar, Default],
            )
            .with_rule(
                NpcsInvulnerable,
                &[Platforms, SoftPlatforms, Wall, Pillar],
                &[Platforms, SoftPlatforms, Pillar],
            )
            .with_rule(
                EnemyProjectiles,
                &[Player, Platforms, SoftPlatforms, Wall, Pillar, ShootOnly, Default],
                &[],
            )
            .with_rule(
                FriendlyProjectiles,
                &[Platforms, SoftPlatforms, Wall, Pillar, Npcs, ShootOnly, Default],
                &[],
            )
            .with_rule(
                Sensors,
                &[Platforms, SoftPlatforms, Wall, Pillar, Player, FriendlyProjectiles, Default],
                &[],
            )
            .with_rule(
                ShootOnly,
                &[Platforms, SoftPlatforms, Wall, FriendlyProjectiles],
                &[Platforms, SoftPlatforms, Wall, FriendlyProjectiles],
            )
            .with_rule(
                Default,
                &[
                    Player,
                    Platforms,
                    SoftPlatforms,
                    Wall,
                    Pillar,
                    Npcs,
                    EnemyProjectiles,
                    FriendlyProjectiles,
                    Sensors,
                    ShootOnly,
                    Default,
                ],
                &[
                    Player,
                    Platforms,
                    SoftPlatforms,
                    Wall,
                    Pillar,
                    Npcs,
                    EnemyProjectiles,
                    FriendlyProjectiles,
                    ShootOnly,
                    Default,
                ],
            )
    }

    #[inline]
    pub fn rule(&self, group: CollisionGroup) -> &CollisionRule {
        &self.rules[group.index()]
    }

    #[inline]
    pub fn detects(&self, group: CollisionGroup) -> GroupSet {
        self.rule(group).detects
    }

    #[inline]
    pub fn resolves(&self, group: CollisionGroup) -> GroupSet {
        self.rule(group).resolves
    }

    /// True when either group detects the other.
    #[inline]
    pub fn should_collide(&self, a: CollisionGroup, b: CollisionGroup) -> bool {
        self.detects(a).contains(b) || self.detects(b).contains(a)
    }

    pub fn flags(&self, a: CollisionGroup, b: CollisionGroup) -> CollisionFlags {
        CollisionFlags {
            detect_a: self.detects(a).contains(b),
            detect_b: self.detects(b).contains(a),
            resolve_a: self.resolves(a).contains(b),
            resolve_b: self.resolves(b).contains(a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CollisionGroup::*;
    use super::*;

    #[test]
    fn group_set_membership() {
        let s = GroupSet::of(&[Player, Wall]);
        assert!(s.contains(Player));
        assert!(s.contains(Wall));
        assert!(!s.contains(Default));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![Player, Wall]);
        assert!(GroupSet::EMPTY.is_empty());
        assert!(GroupSet::of(&[Wall]).is_subset(s));
    }

    #[test]
    fn standard_resolve_sets_are_subsets_of_detect_sets() {
        let rules = CollisionRules::standard();
        for g in CollisionGroup::ALL {
            assert!(rules.resolves(g).is_subset(rules.detects(g)), "{g:?}");
        }
    }

    #[test]
    fn player_is_pushed_by_platforms_but_not_the_reverse() {
        let rules = CollisionRules::standard();
        let f = rules.flags(Platforms, Player);
        assert!(f.detect_a);
        assert!(f.detect_b);
        assert!(!f.resolve_a);
        assert!(f.resolve_b);
    }

    #[test]
    fn one_sided_detection_still_collides() {
        let rules = CollisionRules::standard();
        // Walls detect nothing, yet the player still runs into them.
        assert!(rules.detects(Wall).is_empty());
        assert!(rules.should_collide(Wall, Player));
        let f = rules.flags(Player, Wall);
        assert!(f.detect_a && !f.detect_b);
        assert!(f.resolve_a && !f.resolve_b);
    }

    #[test]
    fn detect_without_resolve() {
        let rules = CollisionRules::standard();
        let f = rules.flags(Player, Npcs);
        assert!(f.detect_a && f.detect_b);
        assert!(!f.resolve_a && !f.resolve_b);
    }

    #[test]
    fn same_group_needs_an_explicit_rule() {
        let rules = CollisionRules::standard();
        assert!(!rules.should_collide(Player, Player));
        assert!(!rules.should_collide(Wall, Platforms));
        assert!(rules.should_collide(Default, Default));
    }

    #[test]
    fn custom_tables() {
        let rules = CollisionRules::empty().with_rule(Sensors, &[Player], &[]);
        assert!(rules.should_collide(Player, Sensors));
        assert!(!rules.should_collide(Player, Default));
    }
}

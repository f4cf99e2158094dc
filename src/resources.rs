//! Resource database
//!
//! Every asset the game uses is named here once. `ResourceDatabase::init`
//! asks a `ResourceLoader` for each of them and keeps the opaque ids it hands
//! back. A missing asset is logged and left empty; the game keeps running
//! without it.

/// Directory assets are loaded from
pub const RESOURCE_DIR: &str = "res";

/// Group every level asset is loaded into
pub const RESOURCE_GROUP: &str = "level_res";

/// Opaque handle issued by a loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Built-in geometry, no file behind it
    Mesh,
    Skybox,
    Material,
    Model,
    Sound,
    Music,
    Font,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Cube,
    Skybox,

    PavementMaterial,
    RoadMaterial,

    CarModel,
    TruckModel,
    CoinModel,
    ConeModel,
    TunnelModel,

    SoundDeath,
    SoundKeyCollect,
    SoundWin,
    SoundFailInput,

    SoundUiClick,
    SoundUiNavigate,
    SoundUiTransition,

    SoundTileRoad,
    SoundTilePavement,

    MusicAmbiance,
    MusicHub,

    Font,
}

impl ResourceType {
    pub const COUNT: usize = 21;

    pub const ALL: [ResourceType; Self::COUNT] = [
        ResourceType::Cube,
        ResourceType::Skybox,
        ResourceType::PavementMaterial,
        ResourceType::RoadMaterial,
        ResourceType::CarModel,
        ResourceType::TruckModel,
        ResourceType::CoinModel,
        ResourceType::ConeModel,
        ResourceType::TunnelModel,
        ResourceType::SoundDeath,
        ResourceType::SoundKeyCollect,
        ResourceType::SoundWin,
        ResourceType::SoundFailInput,
        ResourceType::SoundUiClick,
        ResourceType::SoundUiNavigate,
        ResourceType::SoundUiTransition,
        ResourceType::SoundTileRoad,
        ResourceType::SoundTilePavement,
        ResourceType::MusicAmbiance,
        ResourceType::MusicHub,
        ResourceType::Font,
    ];

    /// Asset name inside the resource directory (no extension)
    pub fn asset_name(&self) -> &'static str {
        match self {
            ResourceType::Cube => "cube",
            ResourceType::Skybox => "dreamy_sky",
            ResourceType::PavementMaterial => "paviment",
            ResourceType::RoadMaterial => "road",
            ResourceType::CarModel => "sedan",
            ResourceType::TruckModel => "delivery",
            ResourceType::CoinModel => "gold_key",
            ResourceType::ConeModel => "cone",
            ResourceType::TunnelModel => "tunnel",
            ResourceType::SoundDeath => "sfx_death",
            ResourceType::SoundKeyCollect => "sfx_key_collect",
            ResourceType::SoundWin => "sfx_win",
            ResourceType::SoundFailInput => "sfx_fail_input",
            ResourceType::SoundUiClick => "sfx_ui_click",
            ResourceType::SoundUiNavigate => "sfx_ui_navigate",
            ResourceType::SoundUiTransition => "sfx_transition",
            ResourceType::SoundTileRoad => "sfx_road",
            ResourceType::SoundTilePavement => "sfx_paviment",
            ResourceType::MusicAmbiance => "music_ambiance",
            ResourceType::MusicHub => "music_nocturne",
            ResourceType::Font => "iosevka_bold",
        }
    }

    pub fn asset_kind(&self) -> AssetKind {
        match self {
            ResourceType::Cube => AssetKind::Mesh,
            ResourceType::Skybox => AssetKind::Skybox,
            ResourceType::PavementMaterial | ResourceType::RoadMaterial => AssetKind::Material,
            ResourceType::CarModel
            | ResourceType::TruckModel
            | ResourceType::CoinModel
            | ResourceType::ConeModel
            | ResourceType::TunnelModel => AssetKind::Model,
            ResourceType::MusicAmbiance | ResourceType::MusicHub => AssetKind::Music,
            ResourceType::Font => AssetKind::Font,
            _ => AssetKind::Sound,
        }
    }
}

/// Turns asset names into ids. Returns None when the asset is unavailable.
pub trait ResourceLoader {
    fn load(&mut self, group: &str, kind: AssetKind, name: &str) -> Option<ResourceId>;
}

pub struct ResourceDatabase {
    group: String,
    entries: [Option<ResourceId>; ResourceType::COUNT],
}

impl ResourceDatabase {
    /// Load every resource into `RESOURCE_GROUP`.
    pub fn init(loader: &mut dyn ResourceLoader) -> Self {
        let mut entries = [None; ResourceType::COUNT];
        let mut missing = 0;

        for ty in ResourceType::ALL {
            entries[ty as usize] = loader.load(RESOURCE_GROUP, ty.asset_kind(), ty.asset_name());
            if entries[ty as usize].is_none() {
                log::warn!("Missing {:?} asset '{}'", ty.asset_kind(), ty.asset_name());
                missing += 1;
            }
        }

        log::info!(
            "Loaded {}/{} resources into '{}'",
            ResourceType::COUNT - missing,
            ResourceType::COUNT,
            RESOURCE_GROUP
        );
        Self {
            group: RESOURCE_GROUP.to_string(),
            entries,
        }
    }

    /// A database with nothing loaded
    pub fn empty() -> Self {
        Self {
            group: RESOURCE_GROUP.to_string(),
            entries: [None; ResourceType::COUNT],
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn get(&self, ty: ResourceType) -> Option<ResourceId> {
        self.entries[ty as usize]
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubLoader;
    use super::*;

    #[test]
    fn test_all_table_is_complete() {
        for (i, ty) in ResourceType::ALL.iter().enumerate() {
            assert_eq!(*ty as usize, i);
        }
    }

    #[test]
    fn test_missing_asset_leaves_gap() {
        let mut loader = StubLoader::without(vec!["gold_key"]);
        let db = ResourceDatabase::init(&mut loader);

        assert_eq!(db.get(ResourceType::CoinModel), None);
        assert!(db.get(ResourceType::CarModel).is_some());
        assert_eq!(db.group(), RESOURCE_GROUP);
    }
}

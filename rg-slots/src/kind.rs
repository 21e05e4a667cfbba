//! The closed sum types the registry derives (spec §4.1): "a closed sum
//! type of resource handles" and "a closed sum type of descriptors".
//!
//! Grounded on §9's redesign note for "heterogeneous slot types via
//! template specialisation": rather than generating one concrete C++ class
//! per handle type, a single macro invocation below lists every handle type
//! known to the engine once and derives the sealed enums from it.

/// Coarse category a resource handle belongs to (spec §4.1: "image, buffer,
/// acceleration-structure, opaque handle").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    Image,
    Buffer,
    AccelerationStructure,
    Opaque,
}

/// Pixel/data format tag for image descriptors. Kept deliberately small —
/// the concrete format enum is a backend concern; this is the subset the
/// core needs to reason about memory requirements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    R8,
    Rg8,
    Rgba8,
    R16Float,
    Rgba16Float,
    R32Float,
    Rgba32Float,
    Depth32Float,
    Depth24Stencil8,
}

impl ImageFormat {
    /// Bytes per texel, used to estimate resource size (spec §4.2).
    pub fn texel_size(self) -> u32 {
        match self {
            ImageFormat::R8 => 1,
            ImageFormat::Rg8 => 2,
            ImageFormat::Rgba8 => 4,
            ImageFormat::R16Float => 2,
            ImageFormat::Rgba16Float => 8,
            ImageFormat::R32Float => 4,
            ImageFormat::Rgba32Float => 16,
            ImageFormat::Depth32Float => 4,
            ImageFormat::Depth24Stencil8 => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub samples: u32,
    pub format: ImageFormat,
}

impl ImageDescriptor {
    pub fn estimated_size(&self) -> u64 {
        u64::from(self.width)
            * u64::from(self.height)
            * u64::from(self.depth.max(1))
            * u64::from(self.samples.max(1))
            * u64::from(self.format.texel_size())
    }
}

bitflags::bitflags! {
    /// Buffer usage flags (spec §3: "buffer size/usage").
    pub struct BufferUsage: u32 {
        const VERTEX = 0b0000_0001;
        const INDEX = 0b0000_0010;
        const UNIFORM = 0b0000_0100;
        const STORAGE = 0b0000_1000;
        const INDIRECT = 0b0001_0000;
        const TRANSFER_SRC = 0b0010_0000;
        const TRANSFER_DST = 0b0100_0000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    pub size: u64,
    pub usage: BufferUsage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccelerationStructureDescriptor {
    pub primitive_count: u32,
    pub is_top_level: bool,
}

impl AccelerationStructureDescriptor {
    /// Coarse size estimate; real backends report the authoritative size
    /// after building, reconciled via `ResourceRegistry::update_size`.
    pub fn estimated_size(&self) -> u64 {
        u64::from(self.primitive_count) * 64
    }
}

/// Descriptor for a resource the core treats as an opaque handle — a
/// backend-specific object the core passes through without interpreting.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueDescriptor {
    pub tag: String,
    pub estimated_size: u64,
}

macro_rules! declare_resource_kinds {
    ($( $variant:ident : $descriptor:ty => $category:expr ),+ $(,)?) => {
        /// Closed sum type of every resource handle type the registry knows
        /// about (spec §4.1). Rejecting an unregistered type is therefore
        /// "free": it simply cannot be named.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ResourceTypeTag {
            $( $variant ),+
        }

        /// Closed sum type of descriptors, one case per handle type.
        #[derive(Clone, Debug, PartialEq)]
        pub enum ResourceDescriptor {
            $( $variant($descriptor) ),+
        }

        impl ResourceTypeTag {
            pub fn category(self) -> ResourceCategory {
                match self {
                    $( ResourceTypeTag::$variant => $category ),+
                }
            }

            /// Every handle type known to the engine, in declaration order.
            pub fn all() -> &'static [ResourceTypeTag] {
                &[ $( ResourceTypeTag::$variant ),+ ]
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( ResourceTypeTag::$variant => stringify!($variant) ),+
                }
            }
        }

        impl ResourceDescriptor {
            pub fn type_tag(&self) -> ResourceTypeTag {
                match self {
                    $( ResourceDescriptor::$variant(_) => ResourceTypeTag::$variant ),+
                }
            }

            pub fn category(&self) -> ResourceCategory {
                self.type_tag().category()
            }
        }
    };
}

declare_resource_kinds! {
    Image: ImageDescriptor => ResourceCategory::Image,
    Buffer: BufferDescriptor => ResourceCategory::Buffer,
    AccelerationStructure: AccelerationStructureDescriptor => ResourceCategory::AccelerationStructure,
    Opaque: OpaqueDescriptor => ResourceCategory::Opaque,
}

impl ResourceDescriptor {
    /// Estimated byte size, used by the resource registry and the budget
    /// manager before a backend allocation has reconciled the real size.
    pub fn estimated_size(&self) -> u64 {
        match self {
            ResourceDescriptor::Image(d) => d.estimated_size(),
            ResourceDescriptor::Buffer(d) => d.size,
            ResourceDescriptor::AccelerationStructure(d) => d.estimated_size(),
            ResourceDescriptor::Opaque(d) => d.estimated_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_reports_its_declared_category() {
        assert_eq!(ResourceTypeTag::Image.category(), ResourceCategory::Image);
        assert_eq!(ResourceTypeTag::Buffer.category(), ResourceCategory::Buffer);
        assert_eq!(
            ResourceTypeTag::AccelerationStructure.category(),
            ResourceCategory::AccelerationStructure
        );
        assert_eq!(ResourceTypeTag::Opaque.category(), ResourceCategory::Opaque);
    }

    #[test]
    fn descriptor_type_tag_matches_variant() {
        let desc = ResourceDescriptor::Buffer(BufferDescriptor {
            size: 1024,
            usage: BufferUsage::UNIFORM,
        });
        assert_eq!(desc.type_tag(), ResourceTypeTag::Buffer);
        assert_eq!(desc.estimated_size(), 1024);
    }

    #[test]
    fn image_estimated_size_accounts_for_format_and_samples() {
        let desc = ImageDescriptor {
            width: 1920,
            height: 1080,
            depth: 1,
            samples: 1,
            format: ImageFormat::Rgba8,
        };
        assert_eq!(desc.estimated_size(), 1920 * 1080 * 4);
    }
}

use nalgebra::{Matrix4, Point2, Point3, Vector3};

mod color;
pub use color::Rgba8;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeUsage {
    Position,
    Normal,
    Color(u32),
    Texcoord(u32),
}

/// The inner components of an [AttributeType]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeComponent {
    U8,
    U16,
    U32,
    F32,
}

impl AttributeComponent {
    pub const fn alignment(self) -> usize {
        use std::mem::align_of;
        match self {
            AttributeComponent::U8 => align_of::<u8>(),
            AttributeComponent::U16 => align_of::<u16>(),
            AttributeComponent::U32 => align_of::<u32>(),
            AttributeComponent::F32 => align_of::<f32>(),
        }
    }

    pub const fn size(self) -> usize {
        use std::mem::size_of;
        match self {
            AttributeComponent::U8 => size_of::<u8>(),
            AttributeComponent::U16 => size_of::<u16>(),
            AttributeComponent::U32 => size_of::<u32>(),
            AttributeComponent::F32 => size_of::<f32>(),
        }
    }
}

/// The shape of a single attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl AttributeType {
    pub const fn size_elements(self) -> usize {
        match self {
            AttributeType::Scalar => 1,
            AttributeType::Vec2 => 2,
            AttributeType::Vec3 => 3,
            AttributeType::Vec4 => 4,
            AttributeType::Mat4 => 16,
        }
    }

    pub const fn size_bytes(self, comp: AttributeComponent) -> usize {
        comp.size() * self.size_elements()
    }
}

/// Trait for types which can be used as vertex attribute data.
///
/// Implementations in this crate are checked at compile time to have the size and alignment
/// their `TYPE` and `COMPONENT` describe.
pub trait Attribute: Sized {
    const TYPE: AttributeType;
    const COMPONENT: AttributeComponent;
}

mod _impl_attr {
    use super::{Attribute, AttributeComponent, AttributeType};

    macro_rules! impl_attr {
        ($t:ident<$c:ident> => $($Target:ty),+) => {
            $(
                const _: () = {
                    static_assertions::const_assert_eq!(
                        std::mem::size_of::<$Target>(),
                        AttributeType::$t.size_bytes(AttributeComponent::$c)
                    );
                    static_assertions::const_assert_eq!(
                        std::mem::align_of::<$Target>(),
                        AttributeComponent::$c.alignment()
                    );
                    impl Attribute for $Target {
                        const TYPE: AttributeType = AttributeType::$t;
                        const COMPONENT: AttributeComponent = AttributeComponent::$c;
                    }
                };
            )+
        };
    }

    impl_attr!(Scalar<F32> => f32);
    impl_attr!(Scalar<U32> => u32);
    impl_attr!(Vec2<F32> => nalgebra::Point2<f32>, nalgebra::Vector2<f32>);
    impl_attr!(Vec3<F32> => nalgebra::Point3<f32>, nalgebra::Vector3<f32>);
    impl_attr!(Vec4<U8> => super::Rgba8);
    impl_attr!(Mat4<F32> => nalgebra::Matrix4<f32>);
}

pub type Position = Point3<f32>;
pub type Normal = Vector3<f32>;
pub type Texcoord = Point2<f32>;
pub type Transform = Matrix4<f32>;

/// Describes one populated attribute array of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
    pub usage: AttributeUsage,
    pub ty: AttributeType,
    pub component: AttributeComponent,
    /// Number of values in the array
    pub count: usize,
}

impl AttributeDescriptor {
    #[inline]
    pub fn of<T: Attribute>(usage: AttributeUsage, count: usize) -> Self {
        Self {
            usage,
            ty: T::TYPE,
            component: T::COMPONENT,
            count,
        }
    }

    /// Size of the described array, in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.ty.size_bytes(self.component) * self.count
    }
}

//! Binding layouts described on the host.
//!
//! A [`LayoutSpec`] is the single source of truth for one pipeline's
//! `@group(0)`: it produces the `wgpu::BindGroupLayout` the pipeline is built
//! with, and every bind group for that pipeline is checked against it by
//! [`BindGroupBuilder`] before it reaches the device. A mismatch is reported as
//! [`LayoutMismatch`] instead of a deferred driver validation error.

use wgpu::ShaderStages;

use crate::data_structures::texture::Texture;

/// How a shader reads a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleKind {
    Float,
    Uint,
    Sint,
    Depth,
}

impl SampleKind {
    pub fn of_format(format: wgpu::TextureFormat) -> Self {
        match format.sample_type(None, None) {
            Some(wgpu::TextureSampleType::Float { .. }) => SampleKind::Float,
            Some(wgpu::TextureSampleType::Uint) => SampleKind::Uint,
            Some(wgpu::TextureSampleType::Sint) => SampleKind::Sint,
            // combined depth-stencil formats need an aspect to answer
            Some(wgpu::TextureSampleType::Depth) | None => SampleKind::Depth,
        }
    }

    fn to_wgpu(self) -> wgpu::TextureSampleType {
        match self {
            SampleKind::Float => wgpu::TextureSampleType::Float { filterable: true },
            SampleKind::Uint => wgpu::TextureSampleType::Uint,
            SampleKind::Sint => wgpu::TextureSampleType::Sint,
            SampleKind::Depth => wgpu::TextureSampleType::Depth,
        }
    }
}

/// Resource kind of one binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Uniform,
    Texture(SampleKind),
    Sampler,
}

/// One `@binding` declared by a pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub binding: u32,
    pub visibility: ShaderStages,
    pub kind: SlotKind,
}

/// One resource offered to a bind group, with the stages that read it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bound {
    pub binding: u32,
    pub stages: ShaderStages,
    pub kind: SlotKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutMismatch {
    #[error("`{layout}` declares binding {binding} but nothing is bound to it")]
    Missing { layout: String, binding: u32 },
    #[error("`{layout}` has no binding {binding}")]
    Unexpected { layout: String, binding: u32 },
    #[error("binding {binding} of `{layout}` is bound twice")]
    Duplicate { layout: String, binding: u32 },
    #[error("binding {binding} of `{layout}` is a {expected:?}, got a {found:?}")]
    Kind {
        layout: String,
        binding: u32,
        expected: SlotKind,
        found: SlotKind,
    },
    #[error("texture at binding {binding} of `{layout}` samples as {found:?}, the pipeline expects {expected:?}")]
    SampleKind {
        layout: String,
        binding: u32,
        expected: SampleKind,
        found: SampleKind,
    },
    #[error("binding {binding} of `{layout}` is visible to {declared:?} but read by {required:?}")]
    Visibility {
        layout: String,
        binding: u32,
        declared: ShaderStages,
        required: ShaderStages,
    },
}

/// The bindings of one bind group layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSpec {
    label: String,
    slots: Vec<Slot>,
}

impl LayoutSpec {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            slots: Vec::new(),
        }
    }

    pub fn uniform(self, binding: u32, visibility: ShaderStages) -> Self {
        self.slot(binding, visibility, SlotKind::Uniform)
    }

    pub fn texture(self, binding: u32, visibility: ShaderStages, sample: SampleKind) -> Self {
        self.slot(binding, visibility, SlotKind::Texture(sample))
    }

    pub fn sampler(self, binding: u32, visibility: ShaderStages) -> Self {
        self.slot(binding, visibility, SlotKind::Sampler)
    }

    fn slot(mut self, binding: u32, visibility: ShaderStages, kind: SlotKind) -> Self {
        self.slots.push(Slot {
            binding,
            visibility,
            kind,
        });
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.slots
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: slot.visibility,
                ty: match slot.kind {
                    SlotKind::Uniform => wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    SlotKind::Texture(sample) => wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: sample.to_wgpu(),
                    },
                    SlotKind::Sampler => {
                        wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                    }
                },
                count: None,
            })
            .collect()
    }

    pub fn create_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &self.entries(),
            label: Some(self.label.as_str()),
        })
    }

    /// Check a set of bound resources against the declared slots.
    pub fn check(&self, bound: &[Bound]) -> Result<(), LayoutMismatch> {
        let label = || self.label.clone();
        for (idx, resource) in bound.iter().enumerate() {
            if bound[..idx].iter().any(|b| b.binding == resource.binding) {
                return Err(LayoutMismatch::Duplicate {
                    layout: label(),
                    binding: resource.binding,
                });
            }
            let slot = self
                .slots
                .iter()
                .find(|slot| slot.binding == resource.binding)
                .ok_or_else(|| LayoutMismatch::Unexpected {
                    layout: label(),
                    binding: resource.binding,
                })?;
            match (slot.kind, resource.kind) {
                (SlotKind::Texture(expected), SlotKind::Texture(found)) if expected != found => {
                    return Err(LayoutMismatch::SampleKind {
                        layout: label(),
                        binding: slot.binding,
                        expected,
                        found,
                    });
                }
                (expected, found) if expected != found => {
                    return Err(LayoutMismatch::Kind {
                        layout: label(),
                        binding: slot.binding,
                        expected,
                        found,
                    });
                }
                _ => (),
            }
            if !slot.visibility.contains(resource.stages) {
                return Err(LayoutMismatch::Visibility {
                    layout: label(),
                    binding: slot.binding,
                    declared: slot.visibility,
                    required: resource.stages,
                });
            }
        }
        if let Some(slot) = self
            .slots
            .iter()
            .find(|slot| !bound.iter().any(|b| b.binding == slot.binding))
        {
            return Err(LayoutMismatch::Missing {
                layout: label(),
                binding: slot.binding,
            });
        }
        Ok(())
    }
}

/// Collects the resources of one bind group and validates them on `build`.
pub struct BindGroupBuilder<'a> {
    spec: &'a LayoutSpec,
    bound: Vec<Bound>,
    resources: Vec<wgpu::BindingResource<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(spec: &'a LayoutSpec) -> Self {
        Self {
            spec,
            bound: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn uniform(self, binding: u32, stages: ShaderStages, buffer: &'a wgpu::Buffer) -> Self {
        self.push(binding, stages, SlotKind::Uniform, buffer.as_entire_binding())
    }

    /// Bind a texture's view; its sample kind comes from the texture format.
    pub fn texture(self, binding: u32, stages: ShaderStages, texture: &'a Texture) -> Self {
        self.push(
            binding,
            stages,
            SlotKind::Texture(texture.sample_kind()),
            wgpu::BindingResource::TextureView(&texture.view),
        )
    }

    pub fn sampler(self, binding: u32, stages: ShaderStages, sampler: &'a wgpu::Sampler) -> Self {
        self.push(
            binding,
            stages,
            SlotKind::Sampler,
            wgpu::BindingResource::Sampler(sampler),
        )
    }

    fn push(
        mut self,
        binding: u32,
        stages: ShaderStages,
        kind: SlotKind,
        resource: wgpu::BindingResource<'a>,
    ) -> Self {
        self.bound.push(Bound {
            binding,
            stages,
            kind,
        });
        self.resources.push(resource);
        self
    }

    pub fn bound(&self) -> &[Bound] {
        &self.bound
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> Result<wgpu::BindGroup, LayoutMismatch> {
        self.spec.check(&self.bound)?;
        let entries: Vec<wgpu::BindGroupEntry> = self
            .bound
            .iter()
            .zip(self.resources)
            .map(|(bound, resource)| wgpu::BindGroupEntry {
                binding: bound.binding,
                resource,
            })
            .collect();
        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some(self.spec.label()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: ShaderStages = ShaderStages::VERTEX_FRAGMENT;

    fn tilemap_like() -> LayoutSpec {
        LayoutSpec::new("tilemap")
            .uniform(0, BOTH)
            .texture(1, ShaderStages::FRAGMENT, SampleKind::Float)
            .texture(2, ShaderStages::FRAGMENT, SampleKind::Uint)
            .sampler(3, ShaderStages::FRAGMENT)
    }

    fn bound(binding: u32, stages: ShaderStages, kind: SlotKind) -> Bound {
        Bound {
            binding,
            stages,
            kind,
        }
    }

    fn matching() -> Vec<Bound> {
        vec![
            bound(0, ShaderStages::FRAGMENT, SlotKind::Uniform),
            bound(1, ShaderStages::FRAGMENT, SlotKind::Texture(SampleKind::Float)),
            bound(2, ShaderStages::FRAGMENT, SlotKind::Texture(SampleKind::Uint)),
            bound(3, ShaderStages::FRAGMENT, SlotKind::Sampler),
        ]
    }

    #[test]
    fn matching_resources_pass() {
        assert_eq!(tilemap_like().check(&matching()), Ok(()));
    }

    #[test]
    fn swapped_sample_kinds_are_rejected() {
        let mut resources = matching();
        resources[1].kind = SlotKind::Texture(SampleKind::Uint);
        resources[2].kind = SlotKind::Texture(SampleKind::Float);
        assert_eq!(
            tilemap_like().check(&resources),
            Err(LayoutMismatch::SampleKind {
                layout: "tilemap".to_string(),
                binding: 1,
                expected: SampleKind::Float,
                found: SampleKind::Uint,
            })
        );
    }

    #[test]
    fn wrong_resource_kind_is_rejected() {
        let mut resources = matching();
        resources[3].kind = SlotKind::Uniform;
        assert!(matches!(
            tilemap_like().check(&resources),
            Err(LayoutMismatch::Kind { binding: 3, expected: SlotKind::Sampler, .. })
        ));
    }

    #[test]
    fn stage_outside_visibility_is_rejected() {
        let mut resources = matching();
        resources[1].stages = ShaderStages::VERTEX;
        assert!(matches!(
            tilemap_like().check(&resources),
            Err(LayoutMismatch::Visibility { binding: 1, .. })
        ));
    }

    #[test]
    fn binding_indices_must_line_up() {
        let mut resources = matching();
        resources.pop();
        assert!(matches!(
            tilemap_like().check(&resources),
            Err(LayoutMismatch::Missing { binding: 3, .. })
        ));

        let mut resources = matching();
        resources[3].binding = 4;
        assert!(matches!(
            tilemap_like().check(&resources),
            Err(LayoutMismatch::Unexpected { binding: 4, .. })
        ));

        let mut resources = matching();
        resources[3] = resources[2];
        assert!(matches!(
            tilemap_like().check(&resources),
            Err(LayoutMismatch::Duplicate { binding: 2, .. })
        ));
    }

    #[test]
    fn sample_kind_follows_format() {
        assert_eq!(SampleKind::of_format(wgpu::TextureFormat::Rgba8UnormSrgb), SampleKind::Float);
        assert_eq!(SampleKind::of_format(wgpu::TextureFormat::R32Uint), SampleKind::Uint);
        assert_eq!(SampleKind::of_format(wgpu::TextureFormat::R32Sint), SampleKind::Sint);
    }

    #[test]
    fn entries_mirror_slots() {
        let entries = tilemap_like().entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[2].binding, 2);
        assert!(matches!(
            entries[2].ty,
            wgpu::BindingType::Texture { sample_type: wgpu::TextureSampleType::Uint, .. }
        ));
        assert_eq!(entries[0].visibility, BOTH);
    }
}

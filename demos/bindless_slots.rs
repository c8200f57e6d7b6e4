//! Bindless resource table example.
//!
//! A renderer with a bindless design hands every texture a stable slot in a
//! gigantic descriptor table. The table index space is enormous, but only a
//! few thousand resources are ever live at once, so the allocator must stay
//! sparse while still reusing freed slots at the low end of the table.

use bitmap_tree_alloc::BitmapTree;

#[derive(Debug)]
struct Texture {
    name: &'static str,
    slot: u64,
}

struct ResourceTable {
    slots: BitmapTree<u64>,
}

impl ResourceTable {
    fn new() -> Self {
        ResourceTable {
            slots: BitmapTree::new(),
        }
    }

    fn register(&mut self, name: &'static str) -> Texture {
        let slot = self.slots.allocate();
        Texture { name, slot }
    }

    fn unregister(&mut self, texture: Texture) {
        self.slots.deallocate(texture.slot);
    }

    fn live(&self) -> u64 {
        self.slots.allocated_slots()
    }
}

fn main() {
    println!("=== Bindless Resource Table Example ===\n");

    let mut table = ResourceTable::new();

    // Register a handful of textures; slots come out lowest-first so the
    // hot descriptors cluster at the start of the table
    let albedo = table.register("albedo");
    let normal = table.register("normal");
    let ao = table.register("ambient_occlusion");
    println!("Registered:");
    for tex in [&albedo, &normal, &ao] {
        println!("  {:<20} -> slot {}", tex.name, tex.slot);
    }

    // Streaming: drop one texture, load two more
    println!("\nUnloading '{}' (slot {})", normal.name, normal.slot);
    table.unregister(normal);

    let detail = table.register("detail");
    let cubemap = table.register("cubemap");
    println!("Loaded '{}' -> slot {} (freed slot reused)", detail.name, detail.slot);
    println!("Loaded '{}' -> slot {}", cubemap.name, cubemap.slot);
    println!("Live resources: {}", table.live());

    // Engine-reserved debug slot pinned far up the table; the allocator
    // only materializes the path to it, not everything in between
    let debug_slot = 1u64 << 33;
    table.slots.allocate_at(debug_slot);
    println!("\nPinned debug view at slot {debug_slot}");
    println!("Table capacity now {} slots", table.slots.current_capacity());
    println!("Live resources: {}", table.live());

    // Churn: a burst of transient render targets comes and goes
    println!("\nSimulating a frame burst of 1000 transient targets...");
    let transient: Vec<u64> = (0..1000).map(|_| table.slots.allocate()).collect();
    println!("Live resources at peak: {}", table.live());
    for slot in transient {
        table.slots.deallocate(slot);
    }
    println!("Live resources after frame: {}", table.live());
}

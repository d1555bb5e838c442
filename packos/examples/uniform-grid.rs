use packos::{sort_by_padded_area, Canvas, GreedyPacker, Rect};

fn main() {
    env_logger::init();

    let mut inputs: Vec<_> = (0..5)
        .map(|index| Rect::new((128, 128), 2, format!("tile-{}.png", index), index))
        .collect();
    sort_by_padded_area(&mut inputs);

    let packer = GreedyPacker::new(Canvas::new(512, 512));

    match packer.pack(&mut inputs) {
        Ok(summary) => println!("Pack summary: {:#?}", summary),
        Err(err) => println!("Packing stopped: {}", err),
    }

    for rect in &inputs {
        println!("{}: {:?}", rect.name_id(), rect.placement());
    }
}

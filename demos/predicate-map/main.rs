use robust2d::Coord;

// Directly evaluate the orientation determinant in plain double precision.
// Refer: https://www.cs.cmu.edu/~quake/robust.html
fn naive_orientation(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    (p.x - b.x) * (a.y - b.y) - (p.y - b.y) * (a.x - b.x)
}

use std::cmp::Ordering;
fn orientation_tests<F>(predicate: F, start: Coord<f64>, width: usize, height: usize) -> Vec<Ordering>
where
    F: Fn(Coord<f64>) -> f64,
{
    use float_extras::f64::nextafter;
    let mut yd = start.y;
    let mut data = Vec::with_capacity(width * height);

    for _ in 0..height {
        let mut xd = start.x;
        for _ in 0..width {
            let p = Coord { x: xd, y: yd };
            data.push(predicate(p).partial_cmp(&0.).unwrap());
            xd = nextafter(xd, std::f64::INFINITY);
        }
        yd = nextafter(yd, std::f64::INFINITY);
    }

    data
}

use std::path::Path;
fn write_png(data: &[Ordering], path: &Path, width: usize, height: usize) {
    assert_eq!(data.len(), width * height);

    use std::fs::File;
    use std::io::BufWriter;

    let file = File::create(path).unwrap();
    let ref mut w = BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width as u32, height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().unwrap();
    let data = data
        .iter()
        .map(|w| match w {
            Ordering::Less => 0u8,
            Ordering::Equal => 127,
            Ordering::Greater => 255,
        })
        .collect::<Vec<_>>();
    writer.write_image_data(&data).unwrap();
}

fn usage(name: &str) -> ! {
    eprintln!("Usage: {} {{naive | robust}} <output.png>", name);
    std::process::exit(1);
}

fn main() {
    let args = std::env::args().collect::<Vec<_>>();
    if args.len() != 3 {
        usage(&args[0])
    }

    let a = Coord { x: 12., y: 12. };
    let b = Coord { x: 24., y: 24. };
    let predicate: Box<dyn Fn(Coord<f64>) -> f64> = match args[1].as_str() {
        "naive" => Box::new(move |p| naive_orientation(p, a, b)),
        "robust" => Box::new(move |p| robust2d::orientation(p, a, b)),
        _ => usage(&args[0]),
    };

    // Walk query points one ulp at a time near (0.5, 0.5); the naive map
    // shows bands of misclassified signs, the robust map a clean partition.
    let data = orientation_tests(predicate, Coord { x: 0.5, y: 0.5 }, 256, 256);
    write_png(&data, Path::new(&args[2]), 256, 256);
}

use omr_scanner::image::GrayBuffer;
use omr_scanner::layout::SheetLayout;

/// Pixel bounds of the painted sheet inside a synthetic photograph.
#[derive(Clone, Copy)]
pub struct SheetBounds {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

/// A featureless mid-gray photograph with no sheet in it.
pub fn blank_photo(width: usize, height: usize) -> GrayBuffer {
    let mut img = GrayBuffer::new(width, height);
    img.data.fill(128);
    img
}

/// A dark photograph with a bright sheet rectangle at `bounds`.
pub fn photo_with_sheet(width: usize, height: usize, bounds: SheetBounds) -> GrayBuffer {
    let mut img = GrayBuffer::new(width, height);
    img.data.fill(40);
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            img.set(x, y, 230);
        }
    }
    img
}

/// Paint a pencil mark filling the center half of the bubble cell for
/// `(test_index, question, choice)` (question 0-based here).
pub fn paint_mark(
    photo: &mut GrayBuffer,
    bounds: SheetBounds,
    layout: &SheetLayout,
    test_index: usize,
    question: usize,
    choice: usize,
) {
    let sheet_w = (bounds.x1 - bounds.x0) as f32;
    let sheet_h = (bounds.y1 - bounds.y0) as f32;
    let col = &layout.columns[test_index];

    let region_x = bounds.x0 as f32 + col.start_x * sheet_w;
    let region_y = bounds.y0 as f32 + col.start_y * sheet_h;
    let cell_w = col.width * sheet_w / layout.choices_per_question as f32;
    let cell_h = col.height * sheet_h / layout.questions_per_column as f32;

    let cx0 = region_x + choice as f32 * cell_w;
    let cy0 = region_y + question as f32 * cell_h;
    let mx0 = (cx0 + 0.25 * cell_w) as usize;
    let mx1 = (cx0 + 0.75 * cell_w) as usize;
    let my0 = (cy0 + 0.25 * cell_h) as usize;
    let my1 = (cy0 + 0.75 * cell_h) as usize;
    for y in my0..my1 {
        for x in mx0..mx1 {
            photo.set(x, y, 25);
        }
    }
}

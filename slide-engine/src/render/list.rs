use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::font::TextRole;
use super::text::draw_rich_text;
use super::{fill_rect, Canvas, SlideRenderer};
use crate::error::RenderError;
use crate::types::{BlockKind, TaskItem};

/// Bullet, numbered and task lists share one layout: a marker column and
/// a hanging-indent text column, items separated by `LIST_LINE_HEIGHT`.
pub(super) fn draw_list(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    kind: BlockKind,
    data: &str,
    top: u32,
) -> Result<u32, RenderError> {
    let pen = r.fonts().pen(TextRole::Body)?;
    let style = r.fonts().style(TextRole::Body);
    let highlight = r.config().colors.highlight.to_rgba();
    let item_gap = r.config().page_layout.list_line_height;

    let indent = (style.size * 1.5).ceil() as u32;
    let text_x = r.left() + indent;
    let text_width = r.text_width().saturating_sub(indent);
    let left = r.left() as i32;

    let mut y = top;
    for (index, line) in data.lines().enumerate() {
        if index > 0 {
            y += item_gap;
        }
        let mid = (y + pen.line_height / 2) as i32;

        let text = match kind {
            BlockKind::NumberedList => {
                pen.draw(canvas, &format!("{}.", index + 1), left, y as i32, highlight);
                line.to_string()
            }
            BlockKind::TaskList => {
                let item = TaskItem::decode(line);
                let side = (style.size * 0.7).ceil() as u32;
                let box_top = mid - side as i32 / 2;
                draw_hollow_rect_mut(canvas, Rect::at(left, box_top).of_size(side, side), highlight);
                if item.checked {
                    let inset = (side / 4).max(1);
                    fill_rect(
                        canvas,
                        left + inset as i32,
                        box_top + inset as i32,
                        side.saturating_sub(inset * 2),
                        side.saturating_sub(inset * 2),
                        highlight,
                    );
                }
                item.text
            }
            _ => {
                let radius = (style.size / 5.0).ceil() as i32;
                draw_filled_circle_mut(canvas, (left + radius, mid), radius, highlight);
                line.to_string()
            }
        };

        let bottom = draw_rich_text(r, canvas, &pen, &text, text_x, y, text_width, None);
        // An item with no words still takes one line.
        y = bottom.max(y + pen.line_height);
    }

    Ok(y + r.block_gap())
}

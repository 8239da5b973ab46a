use crate::directive::{Fit, Gravity};

/// 元画像からの幾何変換の計画
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryPlan {
    /// リサイズ後の寸法
    pub resize: (u32, u32),
    /// リサイズ後に切り出す領域（cover / crop）
    pub crop: Option<Region>,
    /// リサイズ後の画像を配置するキャンバス（pad）
    pub canvas: Option<Region>,
}

/// 位置と寸法。crop では切り出し元、canvas ではキャンバス寸法と配置位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// 倍率を適用して新しい寸法を計算する
fn apply_scale(src_w: u32, src_h: u32, scale: f64) -> (u32, u32) {
    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;

    // 最小1pxを保証
    (new_w.max(1), new_h.max(1))
}

/// fit ごとに拡大を許すかどうか
fn allows_enlargement(fit: Fit) -> bool {
    matches!(fit, Fit::Contain | Fit::Cover | Fit::Pad)
}

/// 余白をどちらに寄せるか（0 = 先頭側、excess = 末尾側）
fn anchor_offset(excess: u32, axis: Axis, gravity: Option<Gravity>) -> u32 {
    match (gravity, axis) {
        (Some(Gravity::Side), _) => 0,
        (Some(Gravity::Left), Axis::Horizontal) | (Some(Gravity::Top), Axis::Vertical) => 0,
        (Some(Gravity::Right), Axis::Horizontal) | (Some(Gravity::Bottom), Axis::Vertical) => {
            excess
        }
        _ => excess / 2,
    }
}

/// 幅・高さ・fit・gravity から幾何変換を計画する
///
/// 幅も高さも指定されていない場合は None（リサイズしない）。
/// 片方のみの場合はアスペクト比に従ってもう片方を決め、
/// cover / crop / pad は contain / scale-down / contain と同じ扱いになる。
pub fn plan_geometry(
    src_w: u32,
    src_h: u32,
    target_w: Option<u32>,
    target_h: Option<u32>,
    fit: Fit,
    gravity: Option<Gravity>,
) -> Option<GeometryPlan> {
    let limit = |scale: f64| {
        if allows_enlargement(fit) {
            scale
        } else {
            scale.min(1.0)
        }
    };

    let (w, h) = match (target_w, target_h) {
        (None, None) => return None,
        (Some(w), None) => {
            let scale = limit(w as f64 / src_w as f64);
            return Some(resize_only(apply_scale(src_w, src_h, scale)));
        }
        (None, Some(h)) => {
            let scale = limit(h as f64 / src_h as f64);
            return Some(resize_only(apply_scale(src_w, src_h, scale)));
        }
        (Some(w), Some(h)) => (w, h),
    };

    let scale_w = w as f64 / src_w as f64;
    let scale_h = h as f64 / src_h as f64;

    let plan = match fit {
        Fit::ScaleDown | Fit::Contain => {
            resize_only(apply_scale(src_w, src_h, limit(scale_w.min(scale_h))))
        }
        Fit::Cover | Fit::Crop => {
            let (rw, rh) = apply_scale(src_w, src_h, limit(scale_w.max(scale_h)));
            // cover は丸め誤差で 1px 足りなくならないよう目標寸法まで広げる
            let (rw, rh) = if fit == Fit::Cover {
                (rw.max(w), rh.max(h))
            } else {
                (rw, rh)
            };
            let (cw, ch) = (rw.min(w), rh.min(h));
            let crop = (cw != rw || ch != rh).then(|| Region {
                x: anchor_offset(rw - cw, Axis::Horizontal, gravity),
                y: anchor_offset(rh - ch, Axis::Vertical, gravity),
                width: cw,
                height: ch,
            });
            GeometryPlan {
                resize: (rw, rh),
                crop,
                canvas: None,
            }
        }
        Fit::Pad => {
            let (rw, rh) = apply_scale(src_w, src_h, scale_w.min(scale_h));
            let (rw, rh) = (rw.min(w), rh.min(h));
            GeometryPlan {
                resize: (rw, rh),
                crop: None,
                canvas: Some(Region {
                    x: anchor_offset(w - rw, Axis::Horizontal, gravity),
                    y: anchor_offset(h - rh, Axis::Vertical, gravity),
                    width: w,
                    height: h,
                }),
            }
        }
    };

    Some(plan)
}

fn resize_only(resize: (u32, u32)) -> GeometryPlan {
    GeometryPlan {
        resize,
        crop: None,
        canvas: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(
        src: (u32, u32),
        target: (Option<u32>, Option<u32>),
        fit: Fit,
        gravity: Option<Gravity>,
    ) -> GeometryPlan {
        plan_geometry(src.0, src.1, target.0, target.1, fit, gravity).unwrap()
    }

    #[test]
    fn test_apply_scale() {
        let (w, h) = apply_scale(1000, 500, 0.4);
        assert_eq!(w, 400);
        assert_eq!(h, 200);

        // 最小1pxを保証
        let (w, h) = apply_scale(10, 10, 0.05);
        assert_eq!(w, 1);
        assert_eq!(h, 1);
    }

    #[test]
    fn test_no_dimensions_means_no_plan() {
        assert_eq!(plan_geometry(100, 100, None, None, Fit::Cover, None), None);
    }

    #[test]
    fn test_scale_down() {
        let p = plan((1920, 1080), (Some(800), Some(600)), Fit::ScaleDown, None);
        assert_eq!(p.resize, (800, 450));
        assert_eq!(p.crop, None);

        // 拡大しない
        let p = plan((100, 50), (Some(200), None), Fit::ScaleDown, None);
        assert_eq!(p.resize, (100, 50));

        let p = plan((1920, 1080), (None, Some(600)), Fit::ScaleDown, None);
        assert_eq!(p.resize, (1067, 600));
    }

    #[test]
    fn test_contain_enlarges() {
        let p = plan((100, 50), (Some(200), Some(200)), Fit::Contain, None);
        assert_eq!(p.resize, (200, 100));
        assert_eq!(p.canvas, None);
    }

    #[test]
    fn test_cover_crops_centered() {
        let p = plan((1000, 500), (Some(400), Some(400)), Fit::Cover, None);
        assert_eq!(p.resize, (800, 400));
        assert_eq!(
            p.crop,
            Some(Region { x: 200, y: 0, width: 400, height: 400 })
        );
    }

    #[test]
    fn test_cover_gravity() {
        let left = plan((1000, 500), (Some(400), Some(400)), Fit::Cover, Some(Gravity::Left));
        assert_eq!(left.crop.unwrap().x, 0);

        let right = plan((1000, 500), (Some(400), Some(400)), Fit::Cover, Some(Gravity::Right));
        assert_eq!(right.crop.unwrap().x, 400);

        // 縦方向の余りに left は影響しない（中央）
        let tall = plan((500, 1000), (Some(400), Some(400)), Fit::Cover, Some(Gravity::Left));
        assert_eq!(tall.crop.unwrap(), Region { x: 0, y: 200, width: 400, height: 400 });

        let bottom = plan((500, 1000), (Some(400), Some(400)), Fit::Cover, Some(Gravity::Bottom));
        assert_eq!(bottom.crop.unwrap().y, 400);

        let side = plan((500, 1000), (Some(400), Some(400)), Fit::Cover, Some(Gravity::Side));
        assert_eq!(side.crop.unwrap().y, 0);
    }

    #[test]
    fn test_cover_enlarges_small_source() {
        let p = plan((100, 50), (Some(200), Some(200)), Fit::Cover, None);
        assert_eq!(p.resize, (400, 200));
        assert_eq!(p.crop.unwrap().width, 200);
    }

    #[test]
    fn test_crop_never_enlarges() {
        // 小さい画像は scale-down と同じ
        let p = plan((100, 50), (Some(200), Some(200)), Fit::Crop, None);
        assert_eq!(p.resize, (100, 50));
        assert_eq!(p.crop, None);

        // 大きい画像は cover と同じ
        let p = plan((1000, 500), (Some(400), Some(400)), Fit::Crop, None);
        assert_eq!(p.resize, (800, 400));
        assert_eq!(p.crop.unwrap(), Region { x: 200, y: 0, width: 400, height: 400 });

        // 片方だけ大きい場合は縮小せず、はみ出した分だけ切り出す
        let p = plan((1000, 100), (Some(400), Some(400)), Fit::Crop, None);
        assert_eq!(p.resize, (1000, 100));
        assert_eq!(p.crop.unwrap(), Region { x: 300, y: 0, width: 400, height: 100 });
    }

    #[test]
    fn test_pad() {
        let p = plan((1000, 500), (Some(400), Some(400)), Fit::Pad, None);
        assert_eq!(p.resize, (400, 200));
        assert_eq!(
            p.canvas,
            Some(Region { x: 0, y: 100, width: 400, height: 400 })
        );

        let top = plan((1000, 500), (Some(400), Some(400)), Fit::Pad, Some(Gravity::Top));
        assert_eq!(top.canvas.unwrap().y, 0);
    }

    #[test]
    fn test_single_dimension_ignores_cover_and_pad() {
        let p = plan((1000, 500), (Some(400), None), Fit::Cover, None);
        assert_eq!(p.resize, (400, 200));
        assert_eq!(p.crop, None);

        let p = plan((1000, 500), (Some(400), None), Fit::Pad, None);
        assert_eq!(p.canvas, None);
    }
}

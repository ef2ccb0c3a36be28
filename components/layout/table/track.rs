/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Sizing of table tracks.
//!
//! The same solver sizes the columns of a table from the widths of its cells, and then its rows
//! from the heights of the cells once they have been laid out at their column widths. It runs in
//! three steps:
//!
//! 1. Cells that span a single track contribute their minimum and maximum sizes, and any
//!    explicit size they ask for, directly to that track.
//! 2. Cells that span several tracks then widen the tracks they span when those are too narrow
//!    for them, and may hand out their percentage request to the tracks without one.
//! 3. Finally [`TrackSolver::distribute`] shares an amount of space between the tracks. Every
//!    track first gets its minimum. Surplus goes to percentage tracks first, then fixed tracks,
//!    then auto tracks. A shortfall is taken back from auto tracks first, then fixed tracks, then
//!    percentage tracks.

use layout_api::style::LengthPercentageOrAuto;
use log::trace;
use serde::Serialize;

use crate::content::ContentSizes;
use crate::error::Result;
use crate::options::LayoutOptions;

/// The size a cell (or the tracks it ends up in) asks for. Percentages are on a 0 to 100 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub enum RequestedSize {
    #[default]
    Auto,
    Pixels(i32),
    Percent(f32),
}

impl RequestedSize {
    /// The order in which shortfalls are taken back from tracks of each kind: auto tracks first,
    /// percentage tracks last.
    fn reclaim_rank(&self) -> u8 {
        match self {
            RequestedSize::Auto => 0,
            RequestedSize::Pixels(_) => 1,
            RequestedSize::Percent(_) => 2,
        }
    }

    fn is_percent(&self) -> bool {
        matches!(self, RequestedSize::Percent(_))
    }

    fn is_pixels(&self) -> bool {
        matches!(self, RequestedSize::Pixels(_))
    }
}

/// What one cell asks of the tracks it spans, along a single axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellContribution {
    pub sizes: ContentSizes,
    /// Border plus padding of the cell on both sides.
    pub edges: i32,
    /// The `width` or `height` of the cell.
    pub size: LengthPercentageOrAuto,
}

/// The measurements of one column or row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TrackMetrics {
    pub min: i32,
    pub max: i32,
    /// The request made by cells spanning only this track.
    pub single_request: RequestedSize,
    /// The request after cells spanning several tracks had their say.
    pub request: RequestedSize,
}

/// Collects cell contributions for the tracks of one axis and distributes space between them.
#[derive(Debug)]
pub struct TrackSolver<'a> {
    tracks: Vec<TrackMetrics>,
    spacing: i32,
    options: &'a LayoutOptions,
}

/// `value * numerator / denominator`, rounded toward zero, without overflowing along the way.
fn scale(value: i32, numerator: i32, denominator: i32) -> i32 {
    debug_assert!(denominator != 0);
    (i64::from(value) * i64::from(numerator) / i64::from(denominator)) as i32
}

impl<'a> TrackSolver<'a> {
    /// A solver for `count` tracks separated by gaps of `spacing` pixels.
    pub fn new(count: usize, spacing: i32, options: &'a LayoutOptions) -> Result<Self> {
        let mut tracks = Vec::new();
        tracks.try_reserve_exact(count)?;
        tracks.resize(count, TrackMetrics::default());
        Ok(TrackSolver {
            tracks,
            spacing,
            options,
        })
    }

    pub fn tracks(&self) -> &[TrackMetrics] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn min_sum(&self) -> i32 {
        self.tracks.iter().map(|track| track.min).sum()
    }

    /// Record that a cell starts in column `index`, whatever its span. Such a column never
    /// collapses below the configured minimum width.
    pub fn note_originating_cell(&mut self, index: usize) {
        let floor = self.options.minimum_column_width;
        if let Some(track) = self.tracks.get_mut(index) {
            track.min = track.min.max(floor);
            track.max = track.max.max(floor);
        }
    }

    /// Account for a cell that spans only the track at `index`.
    pub fn add_single_span(&mut self, index: usize, contribution: CellContribution) {
        let Some(track) = self.tracks.get_mut(index) else {
            return;
        };
        let sizes = contribution.sizes.normalized();
        let edges = contribution.edges.max(0);
        track.min = track.min.max(sizes.min_content + edges);
        track.max = track.max.max(sizes.max_content + edges);

        match contribution.size {
            LengthPercentageOrAuto::Percent(percent) => {
                let percent = percent.max(0.);
                track.single_request = match track.single_request {
                    RequestedSize::Percent(existing) => {
                        RequestedSize::Percent(existing.max(percent))
                    },
                    RequestedSize::Auto | RequestedSize::Pixels(_) => {
                        RequestedSize::Percent(percent)
                    },
                };
            },
            LengthPercentageOrAuto::Pixels(pixels) if pixels >= 0 => {
                let wanted = pixels + edges;
                match track.single_request {
                    RequestedSize::Auto => {
                        track.single_request = RequestedSize::Pixels(wanted);
                        track.max = track.max.max(wanted);
                    },
                    RequestedSize::Pixels(existing) => {
                        track.single_request = RequestedSize::Pixels(existing.max(wanted));
                        track.max = track.max.max(wanted);
                    },
                    RequestedSize::Percent(_) => {},
                }
            },
            LengthPercentageOrAuto::Pixels(_) | LengthPercentageOrAuto::Auto => {},
        }
    }

    /// Start from the single-span requests when accounting for spanning cells.
    pub fn finish_single_spans(&mut self) {
        for track in self.tracks.iter_mut() {
            track.request = track.single_request;
        }
    }

    /// Account for a cell that spans the `span` tracks starting at `start`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "TrackSolver::add_multi_span", skip_all, level = "trace")
    )]
    pub fn add_multi_span(&mut self, start: usize, span: usize, contribution: CellContribution) {
        let end = start.saturating_add(span).min(self.tracks.len());
        if end <= start + 1 {
            return;
        }
        let span = end - start;

        let gaps = self.spacing * (span as i32 - 1);
        let sizes = contribution.sizes.normalized();
        let edges = contribution.edges.max(0);
        let min = sizes.min_content - gaps + edges;
        let max = sizes.max_content - gaps + edges;
        let mut request = match contribution.size {
            LengthPercentageOrAuto::Percent(percent) => RequestedSize::Percent(percent.max(0.)),
            LengthPercentageOrAuto::Pixels(pixels) if pixels > 0 => RequestedSize::Pixels(pixels),
            _ => RequestedSize::Auto,
        };

        let tracks = &mut self.tracks[start..end];
        let mut auto_count = 0;
        let mut percent_count = 0;
        let mut pixel_count = 0;
        let mut total_percent = 0.;
        let mut total_pixels = 0;
        for track in tracks.iter() {
            match track.single_request {
                RequestedSize::Auto => auto_count += 1,
                RequestedSize::Pixels(pixels) => {
                    total_pixels += pixels;
                    pixel_count += 1;
                },
                RequestedSize::Percent(percent) => {
                    total_percent += percent;
                    percent_count += 1;
                },
            }
        }
        let total_min: i32 = tracks.iter().map(|track| track.min).sum();
        let total_max: i32 = tracks.iter().map(|track| track.max).sum();

        // A percentage that the spanned tracks cannot add up to is dropped.
        if let RequestedSize::Percent(percent) = request {
            if percent_count == span || total_percent > percent {
                request = RequestedSize::Auto;
            }
        }
        if let RequestedSize::Percent(percent) = request {
            let mut unclaimed = percent - total_percent;
            let mut weight: i32 = tracks
                .iter()
                .filter(|track| !track.single_request.is_percent())
                .map(|track| track.max)
                .sum();
            for track in tracks.iter_mut() {
                if weight <= 0 {
                    break;
                }
                if !track.single_request.is_percent() {
                    let share = unclaimed * track.max as f32 / weight as f32;
                    track.request = RequestedSize::Percent(share);
                    unclaimed -= share;
                    weight -= track.max;
                }
            }
        }

        if min > total_min {
            let mut remaining = min;
            let mut pixels_left = total_pixels;
            if pixel_count == span {
                // Every track has a fixed size: share the minimum in proportion to those.
                for track in tracks.iter_mut() {
                    if pixels_left <= 0 {
                        break;
                    }
                    let RequestedSize::Pixels(pixels) = track.single_request else {
                        continue;
                    };
                    let width = track.min.max(scale(remaining, pixels, pixels_left));
                    remaining -= width;
                    track.min = width;
                    pixels_left -= pixels;
                }
            } else {
                let mut min_left = total_min;
                let mut max_left = total_max;
                if auto_count > 0 {
                    // Fixed tracks get what they asked for first, if that fits.
                    for track in tracks.iter_mut() {
                        if max_left < 0 {
                            break;
                        }
                        let RequestedSize::Pixels(pixels) = track.single_request else {
                            continue;
                        };
                        if pixels_left <= remaining {
                            let width = track.min.max(pixels);
                            remaining -= width;
                            pixels_left -= pixels;
                            max_left -= track.max;
                            min_left -= track.min;
                            track.min = width;
                        }
                    }
                }
                for track in tracks.iter_mut() {
                    if max_left < 0 || min_left >= remaining {
                        break;
                    }
                    if track.single_request.is_pixels() && auto_count > 0 {
                        continue;
                    }
                    let width = if max_left != 0 {
                        track.min.max(scale(remaining, track.max, max_left))
                    } else {
                        track.min.max(remaining)
                    };
                    max_left -= track.max;
                    min_left -= track.min;
                    remaining -= width;
                    track.min = width;
                }
            }
        }

        if total_max < max {
            let mut max_left = total_max;
            let mut remaining = max;
            for track in tracks.iter_mut() {
                if max_left <= 0 || remaining <= 0 {
                    break;
                }
                let width = track.max.max(scale(remaining, track.max, max_left));
                max_left -= track.max;
                remaining -= width;
                track.max = width;
            }
        }

        for track in tracks.iter_mut() {
            track.max = track.max.max(track.min);
        }
    }

    /// Share `available` pixels between the tracks.
    ///
    /// Whenever `available` covers the sum of the minimum sizes, the result adds up to exactly
    /// `available` and no track is below its minimum. Otherwise every track gets its minimum.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "TrackSolver::distribute", skip_all, level = "trace")
    )]
    pub fn distribute(&self, available: i32) -> Vec<i32> {
        let tracks = &self.tracks;
        let count = tracks.len();
        let mut sizes: Vec<i32> = tracks.iter().map(|track| track.min).collect();
        let mut remaining = available - self.min_sum();

        let mut total_percent = 0.;
        let mut max_fixed = 0;
        let mut max_auto = 0;
        let mut min_auto = 0;
        for track in tracks {
            match track.request {
                RequestedSize::Auto => {
                    max_auto += track.max;
                    min_auto += track.min;
                },
                RequestedSize::Pixels(_) => max_fixed += track.max,
                RequestedSize::Percent(percent) => total_percent += percent,
            }
        }
        trace!("Track sizes after stage 1 (minimum): {sizes:?}");

        if remaining > 0 {
            for (size, track) in sizes.iter_mut().zip(tracks) {
                if let RequestedSize::Percent(percent) = track.request {
                    let wanted = ((50. + percent * available as f32) / 100.) as i32;
                    let grant = (wanted - *size).max(0);
                    *size += grant;
                    remaining -= grant;
                }
            }
            if total_percent > 100. {
                // Percentages past 100% are taken back from the last tracks first.
                let mut excess = ((50. + (total_percent - 100.) * available as f32) / 100.) as i32;
                for (size, track) in sizes.iter_mut().zip(tracks).rev() {
                    if track.request.is_percent() {
                        let taken = (*size).min(excess);
                        excess -= taken;
                        let taken = taken.min(*size - track.min);
                        remaining += taken;
                        *size -= taken;
                    }
                }
            }
        }
        trace!("Track sizes after stage 2 (percentages): {sizes:?}");

        if remaining > 0 {
            for (size, track) in sizes.iter_mut().zip(tracks) {
                if let RequestedSize::Pixels(pixels) = track.request {
                    let grant = (pixels - *size).max(0);
                    *size += grant;
                    remaining -= grant;
                }
            }
        }
        trace!("Track sizes after stage 3 (fixed): {sizes:?}");

        if remaining > 0 {
            let mut max_left = max_auto;
            remaining += min_auto;
            for (size, track) in sizes.iter_mut().zip(tracks) {
                if max_left <= 0 {
                    break;
                }
                if track.request == RequestedSize::Auto {
                    let width = track.min.max(scale(remaining, track.max, max_left));
                    *size = width;
                    remaining -= width;
                    max_left -= track.max;
                }
            }
        }
        trace!("Track sizes after stage 4 (auto): {sizes:?}");

        if remaining > 0 {
            let mut max_left = max_fixed;
            for (size, track) in sizes.iter_mut().zip(tracks) {
                if track.request.is_pixels() && max_left > 0 {
                    let width = scale(remaining, track.max, max_left);
                    max_left -= track.max;
                    remaining -= width;
                    *size += width;
                }
            }
        }
        trace!("Track sizes after stage 5 (surplus to fixed): {sizes:?}");

        if remaining > 0 && total_percent < 100. {
            let mut percent_left = total_percent;
            for (size, track) in sizes.iter_mut().zip(tracks) {
                if let RequestedSize::Percent(percent) = track.request {
                    if percent_left <= 0. {
                        break;
                    }
                    let width = (remaining as f32 * percent / percent_left) as i32;
                    percent_left -= percent;
                    remaining -= width;
                    *size += width;
                }
            }
        }
        trace!("Track sizes after stage 6 (surplus to percentages): {sizes:?}");

        if remaining > 0 {
            for (index, size) in sizes.iter_mut().enumerate() {
                let width = remaining / (count - index) as i32;
                remaining -= width;
                *size += width;
            }
        }
        trace!("Track sizes after stage 7 (surplus to all): {sizes:?}");

        for rank in 0..3 {
            if remaining >= 0 {
                break;
            }
            let mut reclaimable: i32 = sizes
                .iter()
                .zip(tracks)
                .filter(|(_, track)| track.request.reclaim_rank() == rank)
                .map(|(size, track)| size - track.min)
                .sum();
            for (size, track) in sizes.iter_mut().zip(tracks) {
                if reclaimable <= 0 {
                    break;
                }
                if track.request.reclaim_rank() != rank {
                    continue;
                }
                let above_min = *size - track.min;
                let reduction = scale(-remaining, above_min, reclaimable).min(above_min);
                remaining += reduction;
                reclaimable -= above_min;
                *size -= reduction;
            }
            trace!("Track sizes after reclaiming: {sizes:?}");
        }

        sizes
    }

    /// The widest the tracks would usefully be, for sizing an auto-width table.
    ///
    /// `fixed_size` is the table's own size when it has one. When `consider_percentages` is set,
    /// percentage tracks make the table wide enough for each of them to get its share.
    pub fn max_size(&self, fixed_size: Option<i32>, consider_percentages: bool) -> i32 {
        let mut total = 0;
        let mut total_percent = 0.;
        let mut max_non_percent = 0;
        let mut percent_implied = 0;
        let mut has_percent = false;

        for track in &self.tracks {
            total += match track.request {
                RequestedSize::Pixels(pixels) => track.min.max(pixels),
                _ => track.max,
            };
            if let RequestedSize::Percent(percent) = track.request {
                let share = f64::from(percent).min(100. - total_percent);
                let implied = (f64::from(track.max) * 100. / share.max(1.)) as i32;
                percent_implied = percent_implied.max(implied);
                total_percent += share;
                has_percent = true;
            } else {
                max_non_percent += track.max;
            }
        }

        if has_percent && consider_percentages {
            if total_percent <= 99. {
                max_non_percent =
                    (f64::from(max_non_percent) * 100. / (100. - total_percent)) as i32;
            } else if max_non_percent > 0 {
                max_non_percent = self.options.overconstrained_percent_width;
            }
            total = total.max(max_non_percent).max(percent_implied);
        }

        match fixed_size {
            Some(fixed) => total.max(fixed),
            None => total,
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::{TestResult, quickcheck};

    use super::*;

    fn solver_with<'a>(
        options: &'a LayoutOptions,
        tracks: &[(i32, i32, RequestedSize)],
    ) -> TrackSolver<'a> {
        let mut solver = TrackSolver::new(tracks.len(), 0, options).unwrap();
        for (track, &(min, max, request)) in solver.tracks.iter_mut().zip(tracks) {
            *track = TrackMetrics {
                min,
                max,
                single_request: request,
                request,
            };
        }
        solver
    }

    fn auto_cell(min_content: i32, max_content: i32) -> CellContribution {
        CellContribution {
            sizes: ContentSizes::new(min_content, max_content),
            ..Default::default()
        }
    }

    fn arbitrary_request(kind: u8, amount: u8) -> RequestedSize {
        match kind % 3 {
            0 => RequestedSize::Auto,
            1 => RequestedSize::Pixels(amount as i32),
            _ => RequestedSize::Percent((amount % 120) as f32),
        }
    }

    fn arbitrary_size(kind: u8, amount: u8) -> LengthPercentageOrAuto {
        match kind % 3 {
            0 => LengthPercentageOrAuto::Auto,
            1 => LengthPercentageOrAuto::Pixels(amount as i32),
            _ => LengthPercentageOrAuto::Percent((amount % 120) as f32),
        }
    }

    quickcheck! {
        fn min_never_exceeds_max(
            singles: Vec<(u8, u8, u8, u8)>,
            spanning: Vec<(u8, u8, u8, u8, u8, u8)>,
            spacing: u8
        ) -> TestResult {
            if singles.is_empty() {
                return TestResult::discard();
            }
            let options = LayoutOptions::default();
            let count = singles.len();
            let mut solver = TrackSolver::new(count, spacing as i32 % 10, &options).unwrap();
            for (index, &(min, extra, kind, amount)) in singles.iter().enumerate() {
                solver.note_originating_cell(index);
                let contribution = CellContribution {
                    sizes: ContentSizes::new(min as i32, min as i32 + extra as i32),
                    edges: (kind % 4) as i32,
                    size: arbitrary_size(kind, amount),
                };
                solver.add_single_span(index, contribution);
            }
            solver.finish_single_spans();
            for &(start, span, min, extra, kind, amount) in &spanning {
                let start = start as usize % count;
                solver.note_originating_cell(start);
                let contribution = CellContribution {
                    sizes: ContentSizes::new(min as i32 * 3, min as i32 * 3 + extra as i32),
                    edges: 2,
                    size: arbitrary_size(kind, amount),
                };
                solver.add_multi_span(start, span as usize % 4 + 2, contribution);
            }
            TestResult::from_bool(solver.tracks().iter().all(|track| track.min <= track.max))
        }

        fn feasible_budgets_are_spent_exactly(
            tracks: Vec<(u8, u8, u8, u8)>,
            slack: u16
        ) -> TestResult {
            if tracks.is_empty() {
                return TestResult::discard();
            }
            let options = LayoutOptions::default();
            let tracks: Vec<_> = tracks
                .into_iter()
                .map(|(min, extra, kind, amount)| {
                    let min = min as i32;
                    (min, min + extra as i32, arbitrary_request(kind, amount))
                })
                .collect();
            let solver = solver_with(&options, &tracks);
            let available = solver.min_sum() + slack as i32;
            let sizes = solver.distribute(available);
            let above_minimum = sizes
                .iter()
                .zip(solver.tracks())
                .all(|(size, track)| *size >= track.min);
            TestResult::from_bool(above_minimum && sizes.iter().sum::<i32>() == available)
        }
    }

    #[test]
    fn single_auto_column_absorbs_all_slack() {
        let options = LayoutOptions::default();
        let solver = solver_with(&options, &[(50, 80, RequestedSize::Auto)]);
        assert_eq!(solver.distribute(200), vec![200]);
    }

    #[test]
    fn pixel_request_is_honored_before_auto_columns() {
        let options = LayoutOptions::default();
        let solver = solver_with(
            &options,
            &[
                (20, 150, RequestedSize::Pixels(100)),
                (30, 60, RequestedSize::Auto),
            ],
        );
        assert_eq!(solver.distribute(250), vec![100, 150]);
    }

    #[test]
    fn percentages_past_one_hundred_are_trimmed() {
        let options = LayoutOptions::default();
        let half = RequestedSize::Percent(50.);
        let solver = solver_with(&options, &[(10, 10, half), (10, 10, half), (10, 10, half)]);
        let sizes = solver.distribute(300);
        assert_eq!(sizes.iter().sum::<i32>(), 300);
        assert!(sizes.iter().all(|size| *size >= 10));
        // The last column gives its share back first.
        assert_eq!(sizes, vec![145, 145, 10]);
    }

    #[test]
    fn shortfalls_leave_every_track_at_its_minimum() {
        let options = LayoutOptions::default();
        let solver = solver_with(
            &options,
            &[
                (40, 90, RequestedSize::Auto),
                (30, 30, RequestedSize::Pixels(60)),
            ],
        );
        assert_eq!(solver.distribute(10), vec![40, 30]);
    }

    #[test]
    fn spanning_cells_widen_the_columns_they_span() {
        let options = LayoutOptions::default();
        let mut solver = TrackSolver::new(2, 0, &options).unwrap();
        for index in 0..2 {
            solver.note_originating_cell(index);
            solver.add_single_span(index, auto_cell(40, 40));
        }
        solver.finish_single_spans();
        solver.add_multi_span(0, 2, auto_cell(120, 200));

        let tracks = solver.tracks();
        assert!(tracks[0].min + tracks[1].min >= 120);
        assert!(tracks[0].max + tracks[1].max >= 200);
        assert_eq!((tracks[0].min, tracks[1].min), (60, 60));
    }

    #[test]
    fn spanning_cells_account_for_the_gaps_they_cover() {
        let options = LayoutOptions::default();
        let mut solver = TrackSolver::new(2, 10, &options).unwrap();
        for index in 0..2 {
            solver.add_single_span(index, auto_cell(40, 40));
        }
        solver.finish_single_spans();
        // 90 pixels minus the 10 pixel gap fits in the two columns as they are.
        solver.add_multi_span(0, 2, auto_cell(90, 90));
        assert_eq!(solver.tracks()[0].min, 40);
        assert_eq!(solver.tracks()[1].min, 40);
    }

    #[test]
    fn spanning_percentages_go_to_unrequested_columns() {
        let options = LayoutOptions::default();
        let mut solver = TrackSolver::new(3, 0, &options).unwrap();
        solver.add_single_span(0, CellContribution {
            sizes: ContentSizes::new(10, 10),
            edges: 0,
            size: LengthPercentageOrAuto::Percent(20.),
        });
        solver.add_single_span(1, auto_cell(10, 30));
        solver.add_single_span(2, auto_cell(10, 10));
        solver.finish_single_spans();
        solver.add_multi_span(0, 3, CellContribution {
            sizes: ContentSizes::new(0, 0),
            edges: 0,
            size: LengthPercentageOrAuto::Percent(60.),
        });

        let requests: Vec<_> = solver.tracks().iter().map(|track| track.request).collect();
        assert_eq!(
            requests,
            vec![
                RequestedSize::Percent(20.),
                RequestedSize::Percent(30.),
                RequestedSize::Percent(10.),
            ]
        );
        // Single-span requests are left alone.
        assert_eq!(solver.tracks()[1].single_request, RequestedSize::Auto);
    }

    #[test]
    fn unsatisfiable_spanning_percentages_are_dropped() {
        let options = LayoutOptions::default();
        let mut solver = TrackSolver::new(2, 0, &options).unwrap();
        for index in 0..2 {
            solver.add_single_span(index, CellContribution {
                sizes: ContentSizes::new(10, 10),
                edges: 0,
                size: LengthPercentageOrAuto::Percent(40.),
            });
        }
        solver.finish_single_spans();
        solver.add_multi_span(0, 2, CellContribution {
            sizes: ContentSizes::new(0, 0),
            edges: 0,
            size: LengthPercentageOrAuto::Percent(90.),
        });
        assert!(solver.tracks().iter().all(|track| track.request == RequestedSize::Percent(40.)));
    }

    #[test]
    fn fixed_requests_include_cell_edges() {
        let options = LayoutOptions::default();
        let mut solver = TrackSolver::new(1, 0, &options).unwrap();
        solver.add_single_span(0, CellContribution {
            sizes: ContentSizes::new(5, 10),
            edges: 4,
            size: LengthPercentageOrAuto::Pixels(50),
        });
        let track = solver.tracks()[0];
        assert_eq!(track.single_request, RequestedSize::Pixels(54));
        assert_eq!((track.min, track.max), (9, 54));
    }

    #[test]
    fn max_size_makes_room_for_percentages() {
        let options = LayoutOptions::default();
        let solver = solver_with(
            &options,
            &[
                (10, 100, RequestedSize::Percent(50.)),
                (10, 100, RequestedSize::Auto),
            ],
        );
        assert_eq!(solver.max_size(None, true), 200);
        assert_eq!(solver.max_size(Some(500), true), 500);

        let solver = solver_with(
            &options,
            &[
                (10, 100, RequestedSize::Percent(25.)),
                (10, 100, RequestedSize::Auto),
            ],
        );
        assert_eq!(solver.max_size(None, true), 400);
        assert_eq!(solver.max_size(None, false), 200);
    }

    #[test]
    fn overconstrained_percentages_use_the_configured_width() {
        let options = LayoutOptions {
            overconstrained_percent_width: 3000,
            ..Default::default()
        };
        let solver = solver_with(
            &options,
            &[
                (10, 20, RequestedSize::Percent(100.)),
                (10, 20, RequestedSize::Auto),
            ],
        );
        assert_eq!(solver.max_size(None, true), 3000);
    }
}

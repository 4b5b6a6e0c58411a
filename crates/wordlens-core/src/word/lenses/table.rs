//! `w:tbl` ↔ `<table>`.
//!
//! The get direction reconstructs a rectangular grid: cells spanning
//! multiple rows or columns occupy every covered slot, `w:gridSpan` becomes
//! `colspan`, and a `w:vMerge` restart plus its continuation cells become
//! `rowspan`. The put direction rebuilds each row's cells, emitting a
//! `w:tc` where a cell's top-left corner lands and continuation markers for
//! the covered rows beneath it.

use super::super::converter::{WordGetContext, WordPutContext};
use super::{always_visible, block_level, word_container_get, word_container_put, WordLens};
use crate::xml::tags::{
    HTML_COLSPAN, HTML_ROWSPAN, HTML_TABLE, HTML_TBODY, HTML_TD, HTML_TH, HTML_TR, WORD_GRIDCOL,
    WORD_GRIDSPAN, WORD_P, WORD_TBL, WORD_TBLGRID, WORD_TBLPR, WORD_TC, WORD_TCPR, WORD_TR,
    WORD_VAL, WORD_VMERGE,
};
use indextree::NodeId;

#[derive(Clone, Copy, PartialEq)]
enum VMerge {
    None,
    Restart,
    Continue,
}

fn vmerge_state(ctx_doc: &crate::xml::Document, tc: NodeId) -> VMerge {
    let Some(tcpr) = ctx_doc.child_with_tag(tc, WORD_TCPR) else { return VMerge::None };
    let Some(vmerge) = ctx_doc.child_with_tag(tcpr, WORD_VMERGE) else { return VMerge::None };
    match ctx_doc.get_attribute(vmerge, WORD_VAL) {
        Some("restart") => VMerge::Restart,
        _ => VMerge::Continue,
    }
}

fn grid_span(ctx_doc: &crate::xml::Document, tc: NodeId) -> u32 {
    ctx_doc
        .child_with_tag(tc, WORD_TCPR)
        .and_then(|tcpr| ctx_doc.get_child_attribute(tcpr, WORD_GRIDSPAN, WORD_VAL))
        .and_then(|v| v.parse().ok())
        .filter(|&v| v >= 1)
        .unwrap_or(1)
}

fn table_get(ctx: &mut WordGetContext, concrete: NodeId) -> Option<NodeId> {
    let table = ctx.create_abstract(HTML_TABLE, Some(concrete));
    let tbody = ctx.create_abstract(HTML_TBODY, None);
    ctx.html.append_child(table, tbody);

    let rows: Vec<NodeId> = ctx
        .concrete
        .children(concrete)
        .filter(|&c| ctx.concrete.tag(c) == WORD_TR)
        .collect();

    // Column positions per cell, accounting for grid spans.
    let mut cells_by_row: Vec<Vec<(u32, NodeId, u32, VMerge)>> = Vec::new();
    for &row in &rows {
        let mut cells = Vec::new();
        let mut col = 0u32;
        for tc in ctx.concrete.children(row) {
            if ctx.concrete.tag(tc) != WORD_TC {
                continue;
            }
            let span = grid_span(ctx.concrete, tc);
            cells.push((col, tc, span, vmerge_state(ctx.concrete, tc)));
            col += span;
        }
        cells_by_row.push(cells);
    }

    for (r, &row) in rows.iter().enumerate() {
        let tr = ctx.create_abstract(HTML_TR, Some(row));
        ctx.html.append_child(tbody, tr);
        for &(col, tc, span, vmerge) in &cells_by_row[r] {
            if vmerge == VMerge::Continue {
                continue;
            }
            let td = ctx.create_abstract(HTML_TD, Some(tc));
            ctx.html.append_child(tr, td);
            if span > 1 {
                ctx.html.set_attribute(td, HTML_COLSPAN, &span.to_string());
            }
            if vmerge == VMerge::Restart {
                let mut rowspan = 1u32;
                for below in &cells_by_row[r + 1..] {
                    let continues = below
                        .iter()
                        .any(|&(c, _, _, v)| c == col && v == VMerge::Continue);
                    if continues {
                        rowspan += 1;
                    } else {
                        break;
                    }
                }
                if rowspan > 1 {
                    ctx.html.set_attribute(td, HTML_ROWSPAN, &rowspan.to_string());
                }
            }
            word_container_get(ctx, &block_level::LENS, td, tc);
        }
    }
    Some(table)
}

#[derive(Clone, Copy)]
struct Slot {
    origin_td: NodeId,
    origin_row: usize,
    origin_col: usize,
    colspan: u32,
    rowspan: u32,
}

fn abstract_rows(ctx: &WordPutContext, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for child in ctx.html.children(table) {
        match ctx.html.tag(child) {
            HTML_TR => rows.push(child),
            HTML_TBODY => {
                rows.extend(ctx.html.children(child).filter(|&c| ctx.html.tag(c) == HTML_TR));
            }
            _ => {}
        }
    }
    rows
}

fn span_attr(ctx: &WordPutContext, td: NodeId, attr: crate::xml::Tag) -> u32 {
    ctx.html
        .get_attribute(td, attr)
        .and_then(|v| v.parse().ok())
        .filter(|&v| v >= 1)
        .unwrap_or(1)
}

fn build_abstract_grid(ctx: &WordPutContext, rows: &[NodeId]) -> Vec<Vec<Option<Slot>>> {
    let mut grid: Vec<Vec<Option<Slot>>> = vec![Vec::new(); rows.len()];
    for (r, &row) in rows.iter().enumerate() {
        let mut col = 0usize;
        for td in ctx.html.children(row) {
            if !matches!(ctx.html.tag(td), HTML_TD | HTML_TH) {
                continue;
            }
            while grid[r].get(col).map(|s| s.is_some()).unwrap_or(false) {
                col += 1;
            }
            let colspan = span_attr(ctx, td, HTML_COLSPAN);
            let rowspan = span_attr(ctx, td, HTML_ROWSPAN);
            let slot = Slot { origin_td: td, origin_row: r, origin_col: col, colspan, rowspan };
            for dr in 0..rowspan as usize {
                let Some(grid_row) = grid.get_mut(r + dr) else { break };
                if grid_row.len() < col + colspan as usize {
                    grid_row.resize(col + colspan as usize, None);
                }
                for dc in 0..colspan as usize {
                    grid_row[col + dc] = Some(slot);
                }
            }
            col += colspan as usize;
        }
    }
    grid
}

fn update_cell_properties(ctx: &mut WordPutContext, tc: NodeId, colspan: u32, merge: Option<&str>) {
    let tcpr = match ctx.concrete.child_with_tag(tc, WORD_TCPR) {
        Some(tcpr) => tcpr,
        None => {
            let tcpr = ctx.concrete.create_element(WORD_TCPR);
            let first = ctx.concrete.first_child(tc);
            ctx.concrete.insert_before(tc, tcpr, first);
            tcpr
        }
    };

    match ctx.concrete.child_with_tag(tcpr, WORD_GRIDSPAN) {
        Some(existing) if colspan <= 1 => ctx.concrete.remove_node(existing),
        Some(existing) => ctx.concrete.set_attribute(existing, WORD_VAL, &colspan.to_string()),
        None if colspan > 1 => {
            let span = ctx.concrete.create_child_element(tcpr, WORD_GRIDSPAN);
            ctx.concrete.set_attribute(span, WORD_VAL, &colspan.to_string());
        }
        None => {}
    }

    match (ctx.concrete.child_with_tag(tcpr, WORD_VMERGE), merge) {
        (Some(existing), None) => ctx.concrete.remove_node(existing),
        (Some(existing), Some("restart")) => {
            ctx.concrete.set_attribute(existing, WORD_VAL, "restart");
        }
        (Some(existing), Some(_)) => ctx.concrete.remove_attribute(existing, WORD_VAL),
        (None, Some(value)) => {
            let vmerge = ctx.concrete.create_child_element(tcpr, WORD_VMERGE);
            if value == "restart" {
                ctx.concrete.set_attribute(vmerge, WORD_VAL, "restart");
            }
        }
        (None, None) => {}
    }

    if ctx.concrete.first_child(tcpr).is_none() {
        ctx.concrete.remove_node(tcpr);
    }
}

fn ensure_table_grid(ctx: &mut WordPutContext, tbl: NodeId, cols: usize) {
    let grid = match ctx.concrete.child_with_tag(tbl, WORD_TBLGRID) {
        Some(grid) => grid,
        None => {
            let grid = ctx.concrete.create_element(WORD_TBLGRID);
            let anchor = ctx
                .concrete
                .child_with_tag(tbl, WORD_TBLPR)
                .and_then(|pr| ctx.concrete.next_sibling(pr))
                .or_else(|| ctx.concrete.first_child(tbl));
            ctx.concrete.insert_before(tbl, grid, anchor);
            grid
        }
    };
    let existing: Vec<NodeId> = ctx
        .concrete
        .children(grid)
        .filter(|&c| ctx.concrete.tag(c) == WORD_GRIDCOL)
        .collect();
    for &extra in existing.iter().skip(cols) {
        ctx.concrete.remove_node(extra);
    }
    for _ in existing.len()..cols {
        ctx.concrete.create_child_element(grid, WORD_GRIDCOL);
    }
}

fn table_put_impl(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    let rows = abstract_rows(ctx, abstract_node);
    let grid = build_abstract_grid(ctx, &rows);
    let cols = grid.iter().map(Vec::len).max().unwrap_or(0);

    // Rows: keep matched ones, create the rest, drop the vanished.
    let mut desired_rows = Vec::new();
    for &tr in &rows {
        let concrete_tr = ctx
            .lookup_concrete(tr)
            .filter(|&c| ctx.concrete.tag(c) == WORD_TR)
            .unwrap_or_else(|| ctx.concrete.create_element(WORD_TR));
        desired_rows.push(concrete_tr);
    }
    for child in ctx.concrete.child_nodes(concrete) {
        if ctx.concrete.tag(child) == WORD_TR && !desired_rows.contains(&child) {
            for tc in ctx.concrete.child_nodes(child) {
                (block_level::LENS.remove)(ctx, tc);
            }
            ctx.concrete.remove_node(child);
        }
    }
    for &row in &desired_rows {
        ctx.concrete.remove_node(row);
        ctx.concrete.append_child(concrete, row);
    }

    // Cells, row by row.
    for (r, &tr_concrete) in desired_rows.iter().enumerate() {
        let mut desired_tcs: Vec<NodeId> = Vec::new();
        let mut c = 0usize;
        while c < grid[r].len() {
            let Some(slot) = grid[r][c] else {
                c += 1;
                continue;
            };
            if slot.origin_row == r && slot.origin_col == c {
                let td = slot.origin_td;
                let tc = ctx
                    .lookup_concrete(td)
                    .filter(|&n| ctx.concrete.tag(n) == WORD_TC)
                    .unwrap_or_else(|| ctx.concrete.create_element(WORD_TC));
                let merge = (slot.rowspan > 1).then_some("restart");
                update_cell_properties(ctx, tc, slot.colspan, merge);
                word_container_put(ctx, &block_level::LENS, td, tc);
                if ctx.concrete.child_with_tag(tc, WORD_P).is_none() {
                    // A cell must hold at least one paragraph.
                    ctx.concrete.create_child_element(tc, WORD_P);
                }
                desired_tcs.push(tc);
            } else {
                // Covered by a rowspan from above: a continuation marker.
                let tc = ctx.concrete.create_element(WORD_TC);
                update_cell_properties(ctx, tc, slot.colspan, Some("continue"));
                ctx.concrete.create_child_element(tc, WORD_P);
                desired_tcs.push(tc);
            }
            c += slot.colspan as usize;
        }

        for child in ctx.concrete.child_nodes(tr_concrete) {
            if ctx.concrete.tag(child) == WORD_TC && !desired_tcs.contains(&child) {
                for block in ctx.concrete.child_nodes(child) {
                    (block_level::LENS.remove)(ctx, block);
                }
                ctx.concrete.remove_node(child);
            }
        }
        for &tc in &desired_tcs {
            ctx.concrete.remove_node(tc);
            ctx.concrete.append_child(tr_concrete, tc);
        }
    }

    ensure_table_grid(ctx, concrete, cols);
}

fn table_put(ctx: &mut WordPutContext, abstract_node: NodeId, concrete: NodeId) {
    table_put_impl(ctx, abstract_node, concrete);
}

fn table_create(ctx: &mut WordPutContext, abstract_node: NodeId) -> Option<NodeId> {
    if ctx.html.tag(abstract_node) != HTML_TABLE {
        return None;
    }
    let concrete = ctx.concrete.create_element(WORD_TBL);
    table_put_impl(ctx, abstract_node, concrete);
    Some(concrete)
}

fn table_remove(ctx: &mut WordPutContext, concrete: NodeId) {
    for row in ctx.concrete.child_nodes(concrete) {
        if ctx.concrete.tag(row) != WORD_TR {
            continue;
        }
        for tc in ctx.concrete.child_nodes(row) {
            for block in ctx.concrete.child_nodes(tc) {
                (block_level::LENS.remove)(ctx, block);
            }
        }
    }
}

pub static LENS: WordLens = WordLens {
    is_visible: always_visible,
    get: table_get,
    put: table_put,
    create: table_create,
    remove: table_remove,
};

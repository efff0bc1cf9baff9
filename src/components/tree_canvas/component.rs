use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

use super::render;
use super::state::{
	CLICK_SLOP, CanvasState, Selection, edge_at_position, node_at_position, screen_to_graph,
};
use crate::tree::{GraphStore, Position, Viewport};

fn window_size() -> (f64, f64) {
	let win = window();
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(win.inner_width(), 800.0), dim(win.inner_height(), 600.0))
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Full-window canvas drawing the tree at the positions stored in `graph`.
///
/// The canvas never mutates the graph. Clicks, drags, shift-drags, right
/// clicks and Delete/Backspace on the selection are reported through the
/// callbacks; pan and zoom are written to `viewport`.
#[component]
pub fn TreeCanvas(
	#[prop(into)] graph: Signal<GraphStore>,
	viewport: RwSignal<Viewport>,
	#[prop(into)] on_node_activated: Callback<String>,
	#[prop(into)] on_node_moved: Callback<(String, Position)>,
	#[prop(into)] on_connect: Callback<(String, String)>,
	#[prop(into)] on_node_edit: Callback<String>,
	#[prop(into)] on_node_removed: Callback<String>,
	#[prop(into)] on_edge_removed: Callback<String>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = Rc::new(RefCell::new(CanvasState::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = window_size();
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};
		*state_init.borrow_mut() = CanvasState::new(w, h);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = window_size();
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			state_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window()
				.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let drawn = {
				let mut s = state_anim.borrow_mut();
				s.tick(0.016);
				let vp = viewport.try_get_untracked().unwrap_or_default();
				graph
					.try_with_untracked(|g| {
						s.prune_selection(g);
						render::render(&s, g, &vp, &ctx);
					})
					.is_some()
			};
			// The graph signal is disposed once the page unmounts
			if !drawn {
				log::debug!("tree canvas disposed, stopping animation");
				return;
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window().request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window().request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let vp = viewport.get_untracked();
		let (hit, edge) = graph.with_untracked(|g| {
			let hit = node_at_position(g, &vp, x, y)
				.and_then(|id| g.node(&id).map(|n| (id, n.position)));
			match hit {
				Some(hit) => (Some(hit), None),
				None => (None, edge_at_position(g, &vp, x, y)),
			}
		});
		let mut s = state_md.borrow_mut();
		match hit {
			Some((id, position)) => {
				s.selection = Some(Selection::Node(id.clone()));
				s.drag.active = true;
				s.drag.connecting = ev.shift_key();
				s.drag.moved = false;
				s.drag.node_id = Some(id);
				s.drag.start_x = x;
				s.drag.start_y = y;
				s.drag.node_start = position;
				s.drag.pointer = screen_to_graph(&vp, x, y);
			}
			None => {
				s.selection = edge.map(Selection::Edge);
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.viewport_start = vp;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let vp = viewport.get_untracked();
		let mut s = state_mm.borrow_mut();

		if !s.drag.active {
			graph.with_untracked(|g| {
				let hovered = node_at_position(g, &vp, x, y);
				s.set_hover(g, hovered);
			});
		}

		if s.drag.active {
			let (sdx, sdy) = (x - s.drag.start_x, y - s.drag.start_y);
			if (sdx * sdx + sdy * sdy).sqrt() > CLICK_SLOP {
				s.drag.moved = true;
			}
			if s.drag.connecting {
				s.drag.pointer = screen_to_graph(&vp, x, y);
			} else if s.drag.moved {
				if let Some(id) = s.drag.node_id.clone() {
					let position = s.drag.node_start.offset(sdx / vp.zoom, sdy / vp.zoom);
					on_node_moved.run((id, position));
				}
			}
		} else if s.pan.active {
			let start = s.pan.viewport_start;
			let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
			viewport.set(Viewport {
				x: start.x + dx,
				y: start.y + dy,
				..start
			});
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let drag = std::mem::take(&mut state_mu.borrow_mut().drag);
		state_mu.borrow_mut().end_gestures();
		let (Some(id), true) = (drag.node_id, drag.active) else {
			return;
		};

		if drag.connecting {
			let Some((x, y)) = local_point(canvas_ref, &ev) else {
				return;
			};
			let vp = viewport.get_untracked();
			if let Some(target) = graph.with_untracked(|g| node_at_position(g, &vp, x, y)) {
				if target != id {
					on_connect.run((id, target));
				}
			}
		} else if !drag.moved {
			on_node_activated.run(id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut s = state_ml.borrow_mut();
		s.end_gestures();
		graph.with_untracked(|g| s.set_hover(g, None));
	};

	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let vp = viewport.get_untracked();
		if let Some(id) = graph.with_untracked(|g| node_at_position(g, &vp, x, y)) {
			on_node_edit.run(id);
		}
	};

	let state_kd = state.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		if !matches!(ev.key().as_str(), "Delete" | "Backspace") {
			return;
		}
		ev.prevent_default();
		let selection = state_kd.borrow_mut().selection.take();
		match selection {
			Some(Selection::Node(id)) => on_node_removed.run(id),
			Some(Selection::Edge(id)) => on_edge_removed.run(id),
			None => {}
		}
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		viewport.update(|vp| {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (vp.zoom * factor).clamp(0.1, 10.0);
			let ratio = new_k / vp.zoom;
			vp.x = x - (x - vp.x) * ratio;
			vp.y = y - (y - vp.y) * ratio;
			vp.zoom = new_k;
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="tree-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:contextmenu=on_contextmenu
			on:keydown=on_keydown
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

//! Native top-level windows that plugin editor views are attached to
//!
//! Cocoa on macOS, Win32 on Windows. Other platforms have no provider and
//! callers fall back to a generic parameter editor.

use crate::error::{Error, Result};
use crate::geometry::{Bounds, ResizeLimits};
use std::ffi::c_void;

/// A native window hosting a plugin editor
pub trait NativeHostWindow {
    /// Handle the editor attaches to (`NSView*` or `HWND`)
    fn parent_handle(&self) -> *mut c_void;

    /// Outer bounds in screen coordinates, origin top-left
    fn bounds(&self) -> Bounds;

    /// Size of the area the editor is attached to
    fn content_size(&self) -> (i32, i32);

    /// Move and resize
    fn set_bounds(&mut self, bounds: Bounds);

    /// Resize so the content area matches the editor
    fn set_content_size(&mut self, width: i32, height: i32);

    /// Allow or forbid user resizing within limits
    fn set_resize_limits(&mut self, resizable: bool, limits: ResizeLimits);

    /// Bring to the front and focus
    fn to_front(&mut self);

    /// Whether the user closed the window from its title bar
    fn close_requested(&self) -> bool;
}

/// Creates native windows
pub trait NativeWindowProvider {
    /// Create and show a window with the given content size at `bounds`'s position
    fn create_window(&self, title: &str, bounds: Bounds, resizable: bool) -> Result<Box<dyn NativeHostWindow>>;
}

/// Windows of the desktop this process runs on
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopWindows;

impl NativeWindowProvider for DesktopWindows {
    #[cfg(target_os = "macos")]
    fn create_window(&self, title: &str, bounds: Bounds, resizable: bool) -> Result<Box<dyn NativeHostWindow>> {
        Ok(Box::new(macos::CocoaWindow::create(title, bounds, resizable)?))
    }

    #[cfg(target_os = "windows")]
    fn create_window(&self, title: &str, bounds: Bounds, resizable: bool) -> Result<Box<dyn NativeHostWindow>> {
        Ok(Box::new(win32::Win32Window::create(title, bounds, resizable)?))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn create_window(&self, _title: &str, _bounds: Bounds, _resizable: bool) -> Result<Box<dyn NativeHostWindow>> {
        Err(Error::WindowError(
            "Native plugin windows are not supported on this platform".to_string(),
        ))
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use super::*;
    use cocoa::{
        appkit::{NSBackingStoreType, NSWindowStyleMask},
        base::{id, nil, NO, YES},
        foundation::{NSPoint, NSRect, NSSize, NSString},
    };
    use objc::{class, msg_send, sel, sel_impl};

    pub struct CocoaWindow {
        window: id,
        content: id,
    }

    fn screen_height() -> f64 {
        unsafe {
            let screen: id = msg_send![class!(NSScreen), mainScreen];
            if screen == nil {
                return 0.0;
            }
            let frame: NSRect = msg_send![screen, frame];
            frame.size.height
        }
    }

    fn style(resizable: bool) -> NSWindowStyleMask {
        let mut style = NSWindowStyleMask::NSTitledWindowMask
            | NSWindowStyleMask::NSClosableWindowMask
            | NSWindowStyleMask::NSMiniaturizableWindowMask;
        if resizable {
            style |= NSWindowStyleMask::NSResizableWindowMask;
        }
        style
    }

    impl CocoaWindow {
        pub fn create(title: &str, bounds: Bounds, resizable: bool) -> Result<Self> {
            unsafe {
                let frame = NSRect::new(
                    NSPoint::new(0.0, 0.0),
                    NSSize::new(bounds.width as f64, bounds.height as f64),
                );

                let window: id = msg_send![class!(NSWindow), alloc];
                let window: id = msg_send![window,
                    initWithContentRect:frame
                    styleMask:style(resizable)
                    backing:NSBackingStoreType::NSBackingStoreBuffered
                    defer:NO];
                if window == nil {
                    return Err(Error::WindowError("Failed to create NSWindow".to_string()));
                }

                // The window object must survive a title-bar close so it can be polled
                let _: () = msg_send![window, setReleasedWhenClosed:NO];

                let title = NSString::alloc(nil).init_str(title);
                let _: () = msg_send![window, setTitle:title];

                let content: id = msg_send![window, contentView];

                let top_left = NSPoint::new(bounds.x as f64, screen_height() - bounds.y as f64);
                let _: () = msg_send![window, setFrameTopLeftPoint:top_left];

                let created = Self { window, content };
                let _: () = msg_send![window, makeKeyAndOrderFront:nil];
                Ok(created)
            }
        }
    }

    impl NativeHostWindow for CocoaWindow {
        fn parent_handle(&self) -> *mut c_void {
            self.content as *mut c_void
        }

        fn bounds(&self) -> Bounds {
            unsafe {
                let frame: NSRect = msg_send![self.window, frame];
                let top = screen_height() - (frame.origin.y + frame.size.height);
                Bounds::new(
                    frame.origin.x as i32,
                    top as i32,
                    frame.size.width as i32,
                    frame.size.height as i32,
                )
            }
        }

        fn content_size(&self) -> (i32, i32) {
            unsafe {
                let frame: NSRect = msg_send![self.content, frame];
                (frame.size.width as i32, frame.size.height as i32)
            }
        }

        fn set_bounds(&mut self, bounds: Bounds) {
            let frame = NSRect::new(
                NSPoint::new(
                    bounds.x as f64,
                    screen_height() - (bounds.y + bounds.height) as f64,
                ),
                NSSize::new(bounds.width as f64, bounds.height as f64),
            );
            unsafe {
                let _: () = msg_send![self.window, setFrame:frame display:YES];
            }
        }

        fn set_content_size(&mut self, width: i32, height: i32) {
            unsafe {
                let _: () = msg_send![self.window,
                    setContentSize:NSSize::new(width as f64, height as f64)];
            }
        }

        fn set_resize_limits(&mut self, resizable: bool, limits: ResizeLimits) {
            unsafe {
                let _: () = msg_send![self.window, setStyleMask:style(resizable)];
                let _: () = msg_send![self.window,
                    setContentMinSize:NSSize::new(limits.min_width as f64, limits.min_height as f64)];
                let _: () = msg_send![self.window,
                    setContentMaxSize:NSSize::new(limits.max_width as f64, limits.max_height as f64)];
            }
        }

        fn to_front(&mut self) {
            unsafe {
                let _: () = msg_send![self.window, makeKeyAndOrderFront:nil];
            }
        }

        fn close_requested(&self) -> bool {
            unsafe {
                let visible: cocoa::base::BOOL = msg_send![self.window, isVisible];
                let minimized: cocoa::base::BOOL = msg_send![self.window, isMiniaturized];
                visible != YES && minimized != YES
            }
        }
    }

    impl Drop for CocoaWindow {
        fn drop(&mut self) {
            unsafe {
                let _: () = msg_send![self.window, close];
                let _: () = msg_send![self.window, release];
            }
        }
    }
}

#[cfg(target_os = "windows")]
mod win32 {
    use super::*;
    use std::mem;
    use std::ptr;
    use winapi::{
        shared::minwindef::UINT,
        shared::windef::{HWND, RECT},
        um::libloaderapi::GetModuleHandleW,
        um::winuser::{
            AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, GetWindowLongW,
            GetWindowRect, IsWindow, LoadCursorW, RegisterClassExW, SetForegroundWindow,
            SetWindowLongW, SetWindowPos, ShowWindow, UpdateWindow, CS_HREDRAW, CS_VREDRAW,
            CW_USEDEFAULT, GWL_STYLE, IDC_ARROW, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_SHOW, WNDCLASSEXW,
            WS_MAXIMIZEBOX, WS_OVERLAPPEDWINDOW, WS_THICKFRAME,
        },
    };

    pub struct Win32Window {
        hwnd: HWND,
    }

    fn style(resizable: bool) -> u32 {
        if resizable {
            WS_OVERLAPPEDWINDOW
        } else {
            WS_OVERLAPPEDWINDOW & !(WS_THICKFRAME | WS_MAXIMIZEBOX)
        }
    }

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(Some(0)).collect()
    }

    fn outer_size(width: i32, height: i32, style: u32) -> (i32, i32) {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        };
        unsafe {
            AdjustWindowRectEx(&mut rect, style, 0, 0);
        }
        (rect.right - rect.left, rect.bottom - rect.top)
    }

    impl Win32Window {
        pub fn create(title: &str, bounds: Bounds, resizable: bool) -> Result<Self> {
            unsafe {
                let class_name = wide("PluginEditorWindow");
                let mut wc: WNDCLASSEXW = mem::zeroed();
                wc.cbSize = mem::size_of::<WNDCLASSEXW>() as UINT;
                wc.style = CS_HREDRAW | CS_VREDRAW;
                wc.lpfnWndProc = Some(DefWindowProcW);
                wc.hInstance = GetModuleHandleW(ptr::null());
                wc.hCursor = LoadCursorW(ptr::null_mut(), IDC_ARROW);
                wc.lpszClassName = class_name.as_ptr();

                // Fails harmlessly once the class is registered
                RegisterClassExW(&wc);

                let style = style(resizable);
                let (width, height) = outer_size(bounds.width, bounds.height, style);
                let title = wide(title);

                let hwnd = CreateWindowExW(
                    0,
                    class_name.as_ptr(),
                    title.as_ptr(),
                    style,
                    CW_USEDEFAULT,
                    CW_USEDEFAULT,
                    width,
                    height,
                    ptr::null_mut(),
                    ptr::null_mut(),
                    GetModuleHandleW(ptr::null()),
                    ptr::null_mut(),
                );

                if hwnd.is_null() {
                    return Err(Error::WindowError("Failed to create native window".to_string()));
                }

                SetWindowPos(hwnd, ptr::null_mut(), bounds.x, bounds.y, 0, 0, SWP_NOZORDER | SWP_NOSIZE);
                ShowWindow(hwnd, SW_SHOW);
                UpdateWindow(hwnd);
                Ok(Self { hwnd })
            }
        }
    }

    impl NativeHostWindow for Win32Window {
        fn parent_handle(&self) -> *mut c_void {
            self.hwnd as *mut c_void
        }

        fn bounds(&self) -> Bounds {
            let mut rect: RECT = unsafe { mem::zeroed() };
            unsafe {
                GetWindowRect(self.hwnd, &mut rect);
            }
            Bounds::new(rect.left, rect.top, rect.right - rect.left, rect.bottom - rect.top)
        }

        fn content_size(&self) -> (i32, i32) {
            let mut rect: RECT = unsafe { mem::zeroed() };
            unsafe {
                GetClientRect(self.hwnd, &mut rect);
            }
            (rect.right - rect.left, rect.bottom - rect.top)
        }

        fn set_bounds(&mut self, bounds: Bounds) {
            unsafe {
                let style = GetWindowLongW(self.hwnd, GWL_STYLE) as u32;
                let (width, height) = outer_size(bounds.width, bounds.height, style);
                SetWindowPos(self.hwnd, ptr::null_mut(), bounds.x, bounds.y, width, height, SWP_NOZORDER);
            }
        }

        fn set_content_size(&mut self, width: i32, height: i32) {
            unsafe {
                let style = GetWindowLongW(self.hwnd, GWL_STYLE) as u32;
                let (width, height) = outer_size(width, height, style);
                SetWindowPos(
                    self.hwnd,
                    ptr::null_mut(),
                    0,
                    0,
                    width,
                    height,
                    SWP_NOZORDER | SWP_NOMOVE,
                );
            }
        }

        fn set_resize_limits(&mut self, resizable: bool, _limits: ResizeLimits) {
            unsafe {
                SetWindowLongW(self.hwnd, GWL_STYLE, style(resizable) as i32);
            }
        }

        fn to_front(&mut self) {
            unsafe {
                SetForegroundWindow(self.hwnd);
            }
        }

        fn close_requested(&self) -> bool {
            unsafe { IsWindow(self.hwnd) == 0 }
        }
    }

    impl Drop for Win32Window {
        fn drop(&mut self) {
            unsafe {
                if IsWindow(self.hwnd) != 0 {
                    DestroyWindow(self.hwnd);
                }
            }
        }
    }
}
